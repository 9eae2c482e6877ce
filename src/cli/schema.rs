use crate::config::Config;
use crate::error::WriteaidError;
use schemars::schema_for;

pub fn execute() -> Result<(), WriteaidError> {
    let schema = schema_for!(Config);
    let json =
        serde_json::to_string_pretty(&schema).map_err(crate::error::OutputError::Serialize)?;
    println!("{}", json);
    Ok(())
}
