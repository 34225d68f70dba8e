//! One-shot guest runtime: create, execute source, resolve entry, invoke.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ferry_core::DocumentValue;
use rquickjs::{
    CatchResultExt, CaughtError, Context, Ctx, Function, Persistent, Runtime, Value,
    function::Rest,
};
use tracing::{debug, trace};

use crate::config::GuestConfig;
use crate::console;
use crate::convert;
use crate::error::{GuestError, GuestResult};

/// A fresh QuickJS runtime and context.
///
/// Created for exactly one invocation and dropped afterwards. The deadline
/// starts at creation and covers execution and the entry call together.
pub struct GuestRuntime {
    context: Context,
    _runtime: Runtime,
    timeout: Option<Duration>,
    interrupted: Arc<AtomicBool>,
}

/// A guest function resolved from a [`GuestRuntime`]'s global scope.
///
/// Borrows the runtime it came from, so it cannot outlive it or be passed to
/// a different one.
pub struct EntryPoint<'rt> {
    name: String,
    function: Persistent<Function<'static>>,
    _runtime: PhantomData<&'rt GuestRuntime>,
}

impl EntryPoint<'_> {
    /// Name the function was resolved under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for EntryPoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoint").field("name", &self.name).finish()
    }
}

/// Exception details pulled out of a caught guest error.
struct Thrown {
    name: Option<String>,
    message: String,
}

impl Thrown {
    fn from_caught(caught: CaughtError<'_>) -> Self {
        match caught {
            CaughtError::Exception(exception) => {
                let name: Option<String> = exception.as_object().get("name").ok().flatten();
                let message = exception.message().unwrap_or_default();
                let message = match &name {
                    Some(name) if message.is_empty() => name.clone(),
                    Some(name) => format!("{name}: {message}"),
                    None => message,
                };
                Self { name, message }
            },
            CaughtError::Value(value) => Self {
                name: None,
                message: describe_thrown_value(&value),
            },
            CaughtError::Error(error) => Self {
                name: None,
                message: error.to_string(),
            },
        }
    }
}

/// `throw "boom"` and friends: render the thrown value as text.
fn describe_thrown_value(value: &Value<'_>) -> String {
    if let Some(text) = value.as_string().and_then(|s| s.to_string().ok()) {
        return format!("uncaught {text}");
    }
    match convert::from_guest(value).and_then(|doc| {
        serde_json::to_string(&doc).map_err(|e| GuestError::Marshal(e.to_string()))
    }) {
        Ok(text) => format!("uncaught {text}"),
        Err(_) => format!("uncaught {:?}", value.type_of()),
    }
}

impl GuestRuntime {
    /// Create a runtime with the limits in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GuestError::Init`] if QuickJS cannot allocate the runtime or
    /// context, or the console shim fails to install.
    pub fn new(config: &GuestConfig) -> GuestResult<Self> {
        let runtime = Runtime::new().map_err(|e| GuestError::Init(e.to_string()))?;
        if config.memory_limit_bytes > 0 {
            runtime.set_memory_limit(config.memory_limit_bytes);
        }
        if config.max_stack_bytes > 0 {
            runtime.set_max_stack_size(config.max_stack_bytes);
        }

        let interrupted = Arc::new(AtomicBool::new(false));
        if let Some(timeout) = config.timeout {
            let deadline = Instant::now().checked_add(timeout);
            let flag = Arc::clone(&interrupted);
            runtime.set_interrupt_handler(Some(Box::new(move || {
                let expired = deadline.is_some_and(|d| Instant::now() >= d);
                if expired {
                    flag.store(true, Ordering::Relaxed);
                }
                expired
            })));
        }

        let context = Context::full(&runtime).map_err(|e| GuestError::Init(e.to_string()))?;
        if config.console {
            context
                .with(|ctx| console::install(&ctx))
                .map_err(|e| GuestError::Init(format!("console: {e}")))?;
        }

        trace!(
            memory_limit = config.memory_limit_bytes,
            timeout_ms = config.timeout.map(|t| t.as_millis()),
            "Guest runtime created"
        );

        Ok(Self {
            context,
            _runtime: runtime,
            timeout: config.timeout,
            interrupted,
        })
    }

    fn timed_out(&self) -> Option<GuestError> {
        if self.interrupted.load(Ordering::Relaxed) {
            Some(GuestError::Timeout {
                limit_ms: self.timeout.map_or(0, |t| t.as_millis()),
            })
        } else {
            None
        }
    }

    /// Run `source` once as a global script.
    ///
    /// Errors are classified by the thrown object's `name`: anything named
    /// `SyntaxError` is reported as [`GuestError::Syntax`]. That covers parse
    /// failures and also a `SyntaxError` that top-level code throws itself,
    /// e.g. from `JSON.parse` or an explicit `throw new SyntaxError(..)`.
    ///
    /// # Errors
    ///
    /// - [`GuestError::Syntax`] if the source does not parse, or top-level
    ///   code throws a `SyntaxError`
    /// - [`GuestError::Runtime`] if top-level code throws anything else
    /// - [`GuestError::Timeout`] if the deadline interrupted execution
    pub fn execute(&self, source: &str) -> GuestResult<()> {
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source)
                .catch(&ctx)
                .map_err(|caught| self.execution_error(caught))
        })
    }

    /// Bind a string global, e.g. raw input text for a script to read.
    ///
    /// # Errors
    ///
    /// Returns [`GuestError::Marshal`] if the value cannot be stored.
    pub fn set_global_text(&self, name: &str, text: &str) -> GuestResult<()> {
        self.context.with(|ctx| {
            ctx.globals()
                .set(name, text)
                .map_err(|e| GuestError::Marshal(e.to_string()))
        })
    }

    /// Evaluate `source` and return its completion value.
    ///
    /// Strings come back verbatim, `undefined` as `"undefined"`, anything else
    /// as compact JSON.
    ///
    /// # Errors
    ///
    /// Same classes as [`execute`](Self::execute), plus [`GuestError::Marshal`]
    /// if the completion value has no JSON form.
    pub fn evaluate(&self, source: &str) -> GuestResult<String> {
        self.context.with(|ctx| {
            let value: Value = ctx
                .eval(source)
                .catch(&ctx)
                .map_err(|caught| self.execution_error(caught))?;

            if value.is_undefined() {
                return Ok("undefined".to_string());
            }
            if let Some(text) = value.as_string() {
                return text.to_string().map_err(|e| GuestError::Marshal(e.to_string()));
            }
            let doc = self.read_result(&value)?;
            serde_json::to_string(&doc).map_err(|e| GuestError::Marshal(e.to_string()))
        })
    }

    fn execution_error(&self, caught: CaughtError<'_>) -> GuestError {
        if let Some(timeout) = self.timed_out() {
            return timeout;
        }
        let thrown = Thrown::from_caught(caught);
        if thrown.name.as_deref() == Some("SyntaxError") {
            GuestError::Syntax(thrown.message)
        } else {
            GuestError::Runtime(thrown.message)
        }
    }

    /// Look up a callable global binding.
    ///
    /// Top-level `function` declarations, `var`s and lexical `const`/`let`
    /// bindings are all found.
    ///
    /// # Errors
    ///
    /// Returns [`GuestError::Lookup`] if the binding is missing or not a
    /// function.
    pub fn resolve_function(&self, name: &str) -> GuestResult<EntryPoint<'_>> {
        let lookup = || GuestError::Lookup {
            name: name.to_string(),
        };

        self.context.with(|ctx| {
            let value = global_binding(&ctx, name).ok_or_else(lookup)?;
            let function = value.as_function().ok_or_else(lookup)?;
            debug!(entry = name, "Resolved guest entry point");
            Ok(EntryPoint {
                name: name.to_string(),
                function: Persistent::save(&ctx, function.clone()),
                _runtime: PhantomData,
            })
        })
    }

    /// Call a resolved entry point once with marshaled arguments.
    ///
    /// # Errors
    ///
    /// - [`GuestError::Invocation`] if the function throws
    /// - [`GuestError::Marshal`] if the return value has no document form
    /// - [`GuestError::Timeout`] if the deadline interrupted the call
    pub fn invoke(&self, entry: EntryPoint<'_>, args: &[DocumentValue]) -> GuestResult<DocumentValue> {
        self.context.with(|ctx| {
            let function = entry
                .function
                .restore(&ctx)
                .map_err(|e| GuestError::Init(e.to_string()))?;

            let mut guest_args = Vec::with_capacity(args.len());
            for arg in args {
                guest_args
                    .push(convert::to_guest(&ctx, arg).map_err(|e| GuestError::Marshal(e.to_string()))?);
            }

            let result: Value = function
                .call((Rest(guest_args),))
                .catch(&ctx)
                .map_err(|caught| {
                    self.timed_out()
                        .unwrap_or_else(|| GuestError::Invocation(Thrown::from_caught(caught).message))
                })?;

            self.read_result(&result)
        })
    }

    /// Marshal a result. `toJSON` and getters run guest code, so a failure
    /// here may be the deadline firing.
    fn read_result(&self, value: &Value<'_>) -> GuestResult<DocumentValue> {
        convert::from_guest(value).map_err(|e| self.timed_out().unwrap_or(e))
    }
}

/// Global object property first, then the global lexical scope.
fn global_binding<'js>(ctx: &Ctx<'js>, name: &str) -> Option<Value<'js>> {
    let value: Value = ctx.globals().get(name).ok()?;
    if !value.is_undefined() {
        return Some(value);
    }
    if !is_identifier(name) {
        return None;
    }
    let lookup = format!("typeof {name} === 'undefined' ? undefined : {name}");
    ctx.eval::<Value, _>(lookup)
        .ok()
        .filter(|v| !v.is_undefined())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
