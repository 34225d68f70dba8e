//! Static listing of a module's imports and exports.

use serde::Serialize;
use wasmparser::{ExternalKind, Parser, Payload, TypeRef};

use crate::error::{HarnessError, HarnessResult};

/// What an import or export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternKind {
    /// Function.
    Func,
    /// Table.
    Table,
    /// Linear memory.
    Memory,
    /// Global.
    Global,
    /// Exception tag.
    Tag,
}

impl std::fmt::Display for ExternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Func => "func",
            Self::Table => "table",
            Self::Memory => "memory",
            Self::Global => "global",
            Self::Tag => "tag",
        })
    }
}

/// One import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportInfo {
    /// Module namespace, e.g. `env`.
    pub module: String,
    /// Field name.
    pub name: String,
    /// What is imported.
    pub kind: ExternKind,
}

/// One export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportInfo {
    /// Export name.
    pub name: String,
    /// What is exported.
    pub kind: ExternKind,
}

/// Imports and exports of a module, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// Declared imports.
    pub imports: Vec<ImportInfo>,
    /// Declared exports.
    pub exports: Vec<ExportInfo>,
}

impl ModuleInfo {
    /// Names of function exports.
    #[must_use]
    pub fn function_exports(&self) -> Vec<String> {
        self.exports
            .iter()
            .filter(|e| e.kind == ExternKind::Func)
            .map(|e| e.name.clone())
            .collect()
    }
}

/// List a module's imports and exports without compiling it.
///
/// # Errors
///
/// Returns [`HarnessError::Inspect`] if the bytes do not parse.
pub fn inspect(bytes: &[u8]) -> HarnessResult<ModuleInfo> {
    let mut info = ModuleInfo::default();

    for payload in Parser::new(0).parse_all(bytes) {
        let payload = payload.map_err(|e| HarnessError::Inspect(e.to_string()))?;
        match payload {
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import.map_err(|e| HarnessError::Inspect(e.to_string()))?;
                    info.imports.push(ImportInfo {
                        module: import.module.to_string(),
                        name: import.name.to_string(),
                        kind: type_ref_kind(&import.ty),
                    });
                }
            },
            Payload::ExportSection(reader) => {
                for export in reader {
                    let export = export.map_err(|e| HarnessError::Inspect(e.to_string()))?;
                    info.exports.push(ExportInfo {
                        name: export.name.to_string(),
                        kind: external_kind(export.kind),
                    });
                }
            },
            _ => {},
        }
    }

    Ok(info)
}

fn type_ref_kind(ty: &TypeRef) -> ExternKind {
    match ty {
        TypeRef::Table(_) => ExternKind::Table,
        TypeRef::Memory(_) => ExternKind::Memory,
        TypeRef::Global(_) => ExternKind::Global,
        TypeRef::Tag(_) => ExternKind::Tag,
        _ => ExternKind::Func,
    }
}

fn external_kind(kind: ExternalKind) -> ExternKind {
    match kind {
        ExternalKind::Table => ExternKind::Table,
        ExternalKind::Memory => ExternKind::Memory,
        ExternalKind::Global => ExternKind::Global,
        ExternalKind::Tag => ExternKind::Tag,
        _ => ExternKind::Func,
    }
}
