//! In-memory WebAssembly module fixtures.

use wasm_encoder::{
    CodeSection, EntityType, ExportKind, ExportSection, Function, FunctionSection, ImportSection,
    Instruction, Module, TypeSection, ValType,
};

/// One exported function: name, signature and body (without the final `end`).
struct FuncDef<'a> {
    export: &'a str,
    params: &'a [ValType],
    results: &'a [ValType],
    body: &'a [Instruction<'a>],
}

/// An imported function: module, field and signature.
struct ImportDef<'a> {
    module: &'a str,
    field: &'a str,
    params: &'a [ValType],
    results: &'a [ValType],
}

fn build(imports: &[ImportDef<'_>], funcs: &[FuncDef<'_>]) -> Vec<u8> {
    let mut module = Module::new();

    // One type per import, then one per defined function.
    let mut types = TypeSection::new();
    for import in imports {
        types
            .ty()
            .function(import.params.iter().copied(), import.results.iter().copied());
    }
    for func in funcs {
        types
            .ty()
            .function(func.params.iter().copied(), func.results.iter().copied());
    }
    module.section(&types);

    let import_count = u32::try_from(imports.len()).unwrap_or(u32::MAX);

    if !imports.is_empty() {
        let mut section = ImportSection::new();
        for (index, import) in (0u32..).zip(imports) {
            section.import(import.module, import.field, EntityType::Function(index));
        }
        module.section(&section);
    }

    let mut functions = FunctionSection::new();
    for (index, _) in (import_count..).zip(funcs) {
        functions.function(index);
    }
    module.section(&functions);

    let mut exports = ExportSection::new();
    for (index, func) in (import_count..).zip(funcs) {
        exports.export(func.export, ExportKind::Func, index);
    }
    module.section(&exports);

    let mut codes = CodeSection::new();
    for func in funcs {
        let mut body = Function::new(Vec::<(u32, ValType)>::new());
        for instruction in func.body {
            body.instruction(instruction);
        }
        body.instruction(&Instruction::End);
        codes.function(&body);
    }
    module.section(&codes);

    module.finish()
}

/// Exports `add(i32, i32) -> i32`.
#[must_use]
pub fn add_module() -> Vec<u8> {
    build(
        &[],
        &[FuncDef {
            export: "add",
            params: &[ValType::I32, ValType::I32],
            results: &[ValType::I32],
            body: &[
                Instruction::LocalGet(0),
                Instruction::LocalGet(1),
                Instruction::I32Add,
            ],
        }],
    )
}

/// Exports `sub(i32, i32) -> i32` and nothing named `add`.
#[must_use]
pub fn module_without_add() -> Vec<u8> {
    build(
        &[],
        &[FuncDef {
            export: "sub",
            params: &[ValType::I32, ValType::I32],
            results: &[ValType::I32],
            body: &[
                Instruction::LocalGet(0),
                Instruction::LocalGet(1),
                Instruction::I32Sub,
            ],
        }],
    )
}

/// Exports `boom() -> i32`, which always traps.
#[must_use]
pub fn trapping_module() -> Vec<u8> {
    build(
        &[],
        &[FuncDef {
            export: "boom",
            params: &[],
            results: &[ValType::I32],
            body: &[Instruction::Unreachable],
        }],
    )
}

/// Exports `spin()`, an infinite loop for fuel exhaustion tests.
#[must_use]
pub fn looping_module() -> Vec<u8> {
    build(
        &[],
        &[FuncDef {
            export: "spin",
            params: &[],
            results: &[],
            body: &[
                Instruction::Loop(wasm_encoder::BlockType::Empty),
                Instruction::Br(0),
                Instruction::End,
            ],
        }],
    )
}

/// Exports `wide(i64, i64) -> i64` and `scale(f64, f64) -> f64`.
#[must_use]
pub fn numeric_module() -> Vec<u8> {
    build(
        &[],
        &[
            FuncDef {
                export: "wide",
                params: &[ValType::I64, ValType::I64],
                results: &[ValType::I64],
                body: &[
                    Instruction::LocalGet(0),
                    Instruction::LocalGet(1),
                    Instruction::I64Add,
                ],
            },
            FuncDef {
                export: "scale",
                params: &[ValType::F64, ValType::F64],
                results: &[ValType::F64],
                body: &[
                    Instruction::LocalGet(0),
                    Instruction::LocalGet(1),
                    Instruction::F64Mul,
                ],
            },
        ],
    )
}

/// Imports `env.double(i32) -> i32` and exports `apply(i32) -> i32`, which
/// forwards to it.
#[must_use]
pub fn importing_module() -> Vec<u8> {
    build(
        &[ImportDef {
            module: "env",
            field: "double",
            params: &[ValType::I32],
            results: &[ValType::I32],
        }],
        &[FuncDef {
            export: "apply",
            params: &[ValType::I32],
            results: &[ValType::I32],
            body: &[Instruction::LocalGet(0), Instruction::Call(0)],
        }],
    )
}

/// [`add_module`] cut off halfway through.
#[must_use]
pub fn truncated_module() -> Vec<u8> {
    let mut bytes = add_module();
    bytes.truncate(bytes.len() / 2);
    bytes
}
