//! Flows command handler.

use sahayak::{Catalog, FieldKind, FlowKind};
use strum::IntoEnumIterator;

/// Prints every flow, optionally with its request fields.
pub fn handle_flows_command(show_fields: bool) -> anyhow::Result<()> {
    let catalog = Catalog::new()?;

    for kind in FlowKind::iter() {
        let spec = catalog.spec(kind);
        println!("{:<26} {}", spec.name(), spec.description());
        if show_fields {
            for field in spec.schema().fields() {
                let required = if field.required() { "" } else { " (optional)" };
                println!("    {:<24} {}{}", field.name(), describe(field.kind()), required);
            }
        }
    }
    Ok(())
}

fn describe(kind: &FieldKind) -> String {
    let bounds = |min: Option<String>, max: Option<String>| match (min, max) {
        (Some(min), Some(max)) => format!(" {}..={}", min, max),
        (Some(min), None) => format!(" >= {}", min),
        (None, Some(max)) => format!(" <= {}", max),
        (None, None) => String::new(),
    };
    match kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::Number { min, max } => format!(
            "number{}",
            bounds(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
        ),
        FieldKind::Integer { min, max } => format!(
            "integer{}",
            bounds(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
        ),
        FieldKind::Enum(allowed) => format!("one of {}", allowed.join("|")),
        FieldKind::List { delimiter } => format!("list ('{}'-separated)", delimiter),
        FieldKind::Json => "json".to_string(),
    }
}
