//! Guest sources shared by the guest, bridge and integration suites.

/// Copies its input and adds `doubled: true`.
pub const DOUBLED_TRANSFORM: &str = "function transform(x) { return { ...x, doubled: true }; }";

/// Counts calls in a global. A fresh runtime per call always reports 1.
pub const COUNTING_TRANSFORM: &str = r"
var calls = (typeof calls === 'undefined') ? 0 : calls;
function transform(x) {
    calls += 1;
    return { ...x, calls: calls };
}
";

/// Leaves a marker on `globalThis`, and reports whether one was already there.
pub const LEAK_CHECK_TRANSFORM: &str = r"
function transform(x) {
    const seen = globalThis.__ferryMarker !== undefined;
    globalThis.__ferryMarker = x.id;
    return { id: x.id, sawForeignState: seen };
}
";

/// Busy-waits for `x.spinMs` milliseconds, then echoes `x.id`.
pub const SLOW_TRANSFORM: &str = r"
function transform(x) {
    const until = Date.now() + x.spinMs;
    while (Date.now() < until) {}
    return { id: x.id };
}
";

/// Parses, but never defines the entry point.
pub const MISSING_ENTRY: &str = "function somethingElse(x) { return x; }";

/// Does not parse.
pub const BROKEN_SYNTAX: &str = "function transform(x) { return x +; }";

/// Throws while the source is executed.
pub const THROWS_AT_LOAD: &str = "throw new Error('load failed'); function transform(x) { return x; }";

/// Throws when the entry point is called.
pub const THROWS_ON_CALL: &str = "function transform(x) { throw new RangeError('no thanks'); }";

/// Never finishes.
pub const INFINITE_LOOP: &str = "function transform(x) { for (;;) {} }";
