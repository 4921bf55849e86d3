//! Integer addition

use anyhow::anyhow;
use serde_json::{json, Value};

use crate::tools::{Capability, ToolArgs, ToolSignature};

pub fn signature() -> ToolSignature {
    ToolSignature::new("calculator")
        .doc(
            "Add two integers and return the sum.\n\
             * `a` - First operand\n\
             * `b` - Second operand",
        )
        .param("a", "i64")
        .param("b", "i64")
}

pub fn capability() -> Capability {
    Capability::from_fn(|args| async move { add(&args) })
}

fn add(args: &ToolArgs) -> anyhow::Result<Value> {
    let a = args.get_i64("a")?;
    let b = args.get_i64("b")?;
    let sum = a
        .checked_add(b)
        .ok_or_else(|| anyhow!("{} + {} overflows a 64-bit integer", a, b))?;
    Ok(json!(sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> ToolArgs {
        ToolArgs::new("calculator", value.as_object().unwrap().clone())
    }

    #[test]
    fn test_add() {
        assert_eq!(add(&args(json!({"a": 2, "b": 3}))).unwrap(), json!(5));
        assert_eq!(add(&args(json!({"a": -4, "b": 1}))).unwrap(), json!(-3));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = add(&args(json!({"a": i64::MAX, "b": 1}))).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }
}
