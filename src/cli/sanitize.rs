use anyhow::Result;

use autotrack::privacy::{sanitize, FieldDescriptor, FieldValue};

use super::commands::SanitizeArgs;

pub fn cmd_sanitize(args: SanitizeArgs) -> Result<()> {
    let field = FieldDescriptor::new(&args.kind, args.name.as_deref(), &args.class);
    let value = sanitize(&field, FieldValue::Text(args.value.clone()));
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}
