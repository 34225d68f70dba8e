//! `console` shim that forwards guest output to the host trace sink.

use rquickjs::{Coerced, Ctx, Function, Object, function::Rest};

/// Join console arguments the way browsers print them: space separated.
fn join(args: Rest<Coerced<String>>) -> String {
    args.0
        .into_iter()
        .map(|arg| arg.0)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Install `console.log/info/warn/error` on the global object.
pub(crate) fn install(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;

    console.set(
        "log",
        Function::new(ctx.clone(), |args: Rest<Coerced<String>>| {
            tracing::info!(target: "ferry_guest::console", "{}", join(args));
        })?,
    )?;
    console.set(
        "info",
        Function::new(ctx.clone(), |args: Rest<Coerced<String>>| {
            tracing::info!(target: "ferry_guest::console", "{}", join(args));
        })?,
    )?;
    console.set(
        "warn",
        Function::new(ctx.clone(), |args: Rest<Coerced<String>>| {
            tracing::warn!(target: "ferry_guest::console", "{}", join(args));
        })?,
    )?;
    console.set(
        "error",
        Function::new(ctx.clone(), |args: Rest<Coerced<String>>| {
            tracing::error!(target: "ferry_guest::console", "{}", join(args));
        })?,
    )?;
    console.set(
        "debug",
        Function::new(ctx.clone(), |args: Rest<Coerced<String>>| {
            tracing::debug!(target: "ferry_guest::console", "{}", join(args));
        })?,
    )?;

    ctx.globals().set("console", console)
}
