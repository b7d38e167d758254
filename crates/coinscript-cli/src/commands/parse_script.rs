use super::{Context, strip_0x};
use crate::error::Result;
use coinscript_script::Script;
use serde::Serialize;

/// Disassemble a raw script.
#[derive(Debug, clap::Args)]
pub struct ParseScriptCmd {
    /// Script hex, without the length prefix.
    #[arg(index = 1)]
    pub script: String,
}

#[derive(Debug, Serialize)]
pub struct ScriptReport {
    pub asm: String,
    #[serde(rename = "type")]
    pub script_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ParseScriptCmd {
    pub fn run(&self, ctx: &Context) -> Result<ScriptReport> {
        let script = Script::from_raw(&hex::decode(strip_0x(&self.script))?)?;

        Ok(ScriptReport {
            asm: script.to_string(),
            script_type: script.script_type().script_type(),
            address: script.address(ctx.testnet),
        })
    }
}
