//! CSV encoding of the accepted tables.
//!
//! Headers are fixed per table. A field is quoted when it contains a
//! comma, a double quote, CR or LF; embedded quotes are doubled.

use larder_core::{AcceptedTables, Numeric};
use std::fmt;

/// One of the four accepted row-sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Recipes,
    Ingredients,
    Steps,
    Interactions,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Recipes,
        Table::Ingredients,
        Table::Steps,
        Table::Interactions,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Table::Recipes => "recipe.csv",
            Table::Ingredients => "ingredients.csv",
            Table::Steps => "steps.csv",
            Table::Interactions => "interactions.csv",
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            Table::Recipes => &[
                "id",
                "title",
                "cuisine",
                "difficulty",
                "prep_time_min",
                "cook_time_min",
                "total_time_min",
                "tags",
                "occasion",
                "nutrition_groups",
                "created_by",
                "created_at",
            ],
            Table::Ingredients => &["recipe_id", "ingredient_name", "quantity", "unit"],
            Table::Steps => &["recipe_id", "step_number", "step_text"],
            Table::Interactions => &[
                "id",
                "user_id",
                "recipe_id",
                "type",
                "rating",
                "timestamp",
                "metadata_json",
            ],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Render one accepted table as CSV text, header line included.
pub fn encode_table(table: Table, tables: &AcceptedTables) -> String {
    let rows: Vec<Vec<String>> = match table {
        Table::Recipes => tables
            .recipes
            .iter()
            .map(|r| {
                vec![
                    text(&r.id),
                    text(&r.title),
                    text(&r.cuisine),
                    text(&r.difficulty),
                    number(&r.prep_time_min),
                    number(&r.cook_time_min),
                    number(&r.total_time_min),
                    r.tags.clone(),
                    r.occasion.clone(),
                    r.nutrition_groups.clone(),
                    text(&r.created_by),
                    text(&r.created_at),
                ]
            })
            .collect(),
        Table::Ingredients => tables
            .ingredients
            .iter()
            .map(|r| {
                vec![
                    text(&r.recipe_id),
                    text(&r.ingredient_name),
                    text(&r.quantity),
                    text(&r.unit),
                ]
            })
            .collect(),
        Table::Steps => tables
            .steps
            .iter()
            .map(|r| {
                vec![
                    text(&r.recipe_id),
                    r.step_number.map(|n| n.to_string()).unwrap_or_default(),
                    text(&r.step_text),
                ]
            })
            .collect(),
        Table::Interactions => tables
            .interactions
            .iter()
            .map(|r| {
                vec![
                    text(&r.id),
                    text(&r.user_id),
                    text(&r.recipe_id),
                    text(&r.interaction_type),
                    number(&r.rating),
                    text(&r.timestamp),
                    r.metadata_json.clone(),
                ]
            })
            .collect(),
    };

    let mut out = String::new();
    push_line(&mut out, table.header().iter().map(|h| h.to_string()));
    for row in rows {
        push_line(&mut out, row.into_iter());
    }
    out
}

fn push_line(out: &mut String, fields: impl Iterator<Item = String>) {
    let line: Vec<String> = fields.map(|f| escape_field(&f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Whole numbers print without a fractional part.
fn number(value: &Numeric) -> String {
    match value {
        Numeric::Value(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Numeric::Value(v) => v.to_string(),
        Numeric::Absent => String::new(),
        Numeric::Malformed(raw) => raw.clone(),
    }
}
