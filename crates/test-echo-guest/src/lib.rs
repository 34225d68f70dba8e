//! Extism guest plugin for end-to-end testing of the Ferry plugin runner.
//!
//! | Export | Input      | Output          |
//! |--------|------------|-----------------|
//! | `echo` | any text   | `Echo: <input>` |
//! | `add`  | `"a,b"`    | `a + b` as text |
//!
//! Built as a `cdylib` targeting `wasm32-unknown-unknown`.

use extism_pdk::*;

#[plugin_fn]
pub fn echo(input: String) -> FnResult<String> {
    Ok(format!("Echo: {input}"))
}

#[plugin_fn]
pub fn add(input: String) -> FnResult<String> {
    let Some((a, b)) = input.split_once(',') else {
        return Err(WithReturnCode::new_with_message(
            1,
            "expected two comma-separated numbers",
        ));
    };

    let a: i32 = a
        .trim()
        .parse()
        .map_err(|_| WithReturnCode::new_with_message(1, "invalid first number"))?;
    let b: i32 = b
        .trim()
        .parse()
        .map_err(|_| WithReturnCode::new_with_message(1, "invalid second number"))?;

    let sum = a
        .checked_add(b)
        .ok_or_else(|| WithReturnCode::new_with_message(1, "sum overflows i32"))?;
    Ok(sum.to_string())
}
