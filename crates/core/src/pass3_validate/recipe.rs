//! Recipe-side rules: recipe rows and their ingredient and step rows.

use super::RecipeScope;
use crate::rows::{is_blank, IngredientRow, RecipeRow, StepRow};
use crate::rules::{Rule, RuleId, DIFFICULTIES};
use larder_documents::Numeric;

/// Recipe rules in evaluation order.
pub(super) fn recipe_rules<'a>() -> Vec<Box<dyn Rule<RecipeRow, RecipeScope<'a>>>> {
    vec![
        Box::new(RequiredColumns),
        Box::new(NonNegativeTimes),
        Box::new(NumericTimes),
        Box::new(DifficultyDomain),
        Box::new(IngredientsPresent),
        Box::new(StepsPresent),
    ]
}

fn times(row: &RecipeRow) -> [(&'static str, &Numeric); 3] {
    [
        ("prep_time_min", &row.prep_time_min),
        ("cook_time_min", &row.cook_time_min),
        ("total_time_min", &row.total_time_min),
    ]
}

pub(super) struct RequiredColumns;

impl<'a> Rule<RecipeRow, RecipeScope<'a>> for RequiredColumns {
    fn id(&self) -> RuleId {
        RuleId::MissingRecipeColumns
    }

    fn check(&self, row: &RecipeRow, _: &RecipeScope<'a>) -> Option<String> {
        let mut missing: Vec<&str> = [
            ("id", &row.id),
            ("title", &row.title),
            ("cuisine", &row.cuisine),
            ("difficulty", &row.difficulty),
        ]
        .into_iter()
        .filter(|(_, v)| is_blank(v))
        .map(|(name, _)| name)
        .collect();

        missing.extend(
            times(row)
                .into_iter()
                .filter(|(_, v)| v.is_absent())
                .map(|(name, _)| name),
        );

        if missing.is_empty() {
            None
        } else {
            Some(format!("missing required field(s): {}", missing.join(", ")))
        }
    }
}

pub(super) struct NonNegativeTimes;

impl<'a> Rule<RecipeRow, RecipeScope<'a>> for NonNegativeTimes {
    fn id(&self) -> RuleId {
        RuleId::NegativeTimeValues
    }

    fn check(&self, row: &RecipeRow, _: &RecipeScope<'a>) -> Option<String> {
        let negative: Vec<String> = times(row)
            .into_iter()
            .filter_map(|(name, v)| match v {
                Numeric::Value(n) if *n < 0.0 => Some(format!("{} = {}", name, n)),
                _ => None,
            })
            .collect();
        (!negative.is_empty()).then(|| format!("negative time: {}", negative.join(", ")))
    }
}

pub(super) struct NumericTimes;

impl<'a> Rule<RecipeRow, RecipeScope<'a>> for NumericTimes {
    fn id(&self) -> RuleId {
        RuleId::InvalidTimeFormat
    }

    fn check(&self, row: &RecipeRow, _: &RecipeScope<'a>) -> Option<String> {
        let malformed: Vec<String> = times(row)
            .into_iter()
            .filter_map(|(name, v)| match v {
                Numeric::Malformed(raw) => Some(format!("{} = {:?}", name, raw)),
                _ => None,
            })
            .collect();
        (!malformed.is_empty()).then(|| format!("not a number: {}", malformed.join(", ")))
    }
}

pub(super) struct DifficultyDomain;

impl<'a> Rule<RecipeRow, RecipeScope<'a>> for DifficultyDomain {
    fn id(&self) -> RuleId {
        RuleId::InvalidDifficultyValues
    }

    fn check(&self, row: &RecipeRow, _: &RecipeScope<'a>) -> Option<String> {
        // Absence is reported by RequiredColumns.
        let difficulty = row.difficulty.as_deref().filter(|d| !d.trim().is_empty())?;
        if DIFFICULTIES.contains(&difficulty) {
            None
        } else {
            Some(format!(
                "difficulty '{}' not in {{{}}}",
                difficulty,
                DIFFICULTIES.join(", ")
            ))
        }
    }
}

pub(super) struct IngredientsPresent;

impl<'a> Rule<RecipeRow, RecipeScope<'a>> for IngredientsPresent {
    fn id(&self) -> RuleId {
        RuleId::InvalidIngredients
    }

    fn check(&self, _: &RecipeRow, scope: &RecipeScope<'a>) -> Option<String> {
        if scope.ingredients.is_empty() {
            return Some("recipe has no ingredient rows".to_string());
        }
        let incomplete = scope
            .ingredients
            .iter()
            .filter(|r| IngredientComplete.check(r, &()).is_some())
            .count();
        (incomplete > 0).then(|| {
            format!(
                "{} of {} ingredient rows incomplete",
                incomplete,
                scope.ingredients.len()
            )
        })
    }
}

pub(super) struct StepsPresent;

impl<'a> Rule<RecipeRow, RecipeScope<'a>> for StepsPresent {
    fn id(&self) -> RuleId {
        RuleId::InvalidSteps
    }

    fn check(&self, _: &RecipeRow, scope: &RecipeScope<'a>) -> Option<String> {
        if scope.steps.is_empty() {
            return Some("recipe has no step rows".to_string());
        }
        let incomplete = scope
            .steps
            .iter()
            .filter(|r| StepComplete.check(r, &()).is_some())
            .count();
        (incomplete > 0).then(|| {
            format!(
                "{} of {} step rows incomplete",
                incomplete,
                scope.steps.len()
            )
        })
    }
}

/// Row-level ingredient check. Several missing fields are one violation.
pub(super) struct IngredientComplete;

impl Rule<IngredientRow, ()> for IngredientComplete {
    fn id(&self) -> RuleId {
        RuleId::InvalidIngredients
    }

    fn check(&self, row: &IngredientRow, _: &()) -> Option<String> {
        let missing: Vec<&str> = [
            ("name", &row.ingredient_name),
            ("quantity", &row.quantity),
            ("unit", &row.unit),
        ]
        .into_iter()
        .filter(|(_, v)| is_blank(v))
        .map(|(name, _)| name)
        .collect();
        (!missing.is_empty()).then(|| format!("ingredient missing {}", missing.join(", ")))
    }
}

/// Row-level step check.
pub(super) struct StepComplete;

impl Rule<StepRow, ()> for StepComplete {
    fn id(&self) -> RuleId {
        RuleId::InvalidSteps
    }

    fn check(&self, row: &StepRow, _: &()) -> Option<String> {
        match (row.step_number.is_none(), is_blank(&row.step_text)) {
            (false, false) => None,
            (true, false) => Some("step number unresolved".to_string()),
            (false, true) => Some("step text missing".to_string()),
            (true, true) => Some("step number unresolved, step text missing".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RecipeRow {
        RecipeRow {
            position: 0,
            id: Some("r1".into()),
            title: Some("Khichdi".into()),
            cuisine: Some("Indian".into()),
            difficulty: Some("Easy".into()),
            prep_time_min: Numeric::Value(20.0),
            cook_time_min: Numeric::Value(25.0),
            total_time_min: Numeric::Value(45.0),
            tags: String::new(),
            occasion: String::new(),
            nutrition_groups: String::new(),
            created_by: None,
            created_at: None,
        }
    }

    fn ingredient(name: Option<&str>, unit: Option<&str>) -> IngredientRow {
        IngredientRow {
            recipe_position: 0,
            recipe_id: Some("r1".into()),
            position: 0,
            ingredient_name: name.map(String::from),
            quantity: Some("2".into()),
            unit: unit.map(String::from),
        }
    }

    fn step(number: Option<u32>, text: Option<&str>) -> StepRow {
        StepRow {
            recipe_position: 0,
            recipe_id: Some("r1".into()),
            position: 0,
            step_number: number,
            step_text: text.map(String::from),
        }
    }

    fn empty_scope<'a>() -> RecipeScope<'a> {
        RecipeScope {
            ingredients: Vec::new(),
            steps: Vec::new(),
        }
    }

    #[test]
    fn required_columns_lists_every_missing_field() {
        let mut r = row();
        r.title = Some("  ".into());
        r.total_time_min = Numeric::Absent;
        let detail = RequiredColumns.check(&r, &empty_scope()).unwrap();
        assert_eq!(detail, "missing required field(s): title, total_time_min");
    }

    #[test]
    fn negative_times_flagged_but_zero_allowed() {
        let mut r = row();
        r.prep_time_min = Numeric::Value(0.0);
        assert!(NonNegativeTimes.check(&r, &empty_scope()).is_none());
        r.cook_time_min = Numeric::Value(-5.0);
        let detail = NonNegativeTimes.check(&r, &empty_scope()).unwrap();
        assert!(detail.contains("cook_time_min = -5"));
    }

    #[test]
    fn malformed_times_are_their_own_rule() {
        let mut r = row();
        r.prep_time_min = Numeric::Malformed("NaN".into());
        assert!(NonNegativeTimes.check(&r, &empty_scope()).is_none());
        assert!(RequiredColumns.check(&r, &empty_scope()).is_none());
        assert!(NumericTimes.check(&r, &empty_scope()).is_some());
    }

    #[test]
    fn difficulty_outside_domain() {
        let mut r = row();
        assert!(DifficultyDomain.check(&r, &empty_scope()).is_none());
        r.difficulty = Some("Extreme".into());
        assert!(DifficultyDomain.check(&r, &empty_scope()).is_some());
        r.difficulty = None;
        assert!(DifficultyDomain.check(&r, &empty_scope()).is_none());
    }

    #[test]
    fn ingredient_with_several_gaps_is_one_violation() {
        let detail = IngredientComplete
            .check(&ingredient(None, None), &())
            .unwrap();
        assert_eq!(detail, "ingredient missing name, unit");
        assert!(IngredientComplete
            .check(&ingredient(Some("Rice"), Some("cups")), &())
            .is_none());
    }

    #[test]
    fn recipe_level_rules_see_children() {
        let good = ingredient(Some("Rice"), Some("cups"));
        let bad = ingredient(Some("Salt"), None);
        let s1 = step(Some(1), Some("Wash rice."));
        let s2 = step(None, Some("Serve."));

        let scope = RecipeScope {
            ingredients: vec![&good, &bad],
            steps: vec![&s1, &s2],
        };
        assert_eq!(
            IngredientsPresent.check(&row(), &scope).as_deref(),
            Some("1 of 2 ingredient rows incomplete")
        );
        assert_eq!(
            StepsPresent.check(&row(), &scope).as_deref(),
            Some("1 of 2 step rows incomplete")
        );

        assert_eq!(
            StepsPresent.check(&row(), &empty_scope()).as_deref(),
            Some("recipe has no step rows")
        );
    }

    #[test]
    fn step_checks() {
        assert!(StepComplete.check(&step(Some(1), Some("x")), &()).is_none());
        assert!(StepComplete.check(&step(Some(1), Some(" ")), &()).is_some());
        assert!(StepComplete.check(&step(None, Some("x")), &()).is_some());
    }
}
