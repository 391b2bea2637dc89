//! Reflection over Rust sources.
//!
//! [`SourceReflector`] parses a project with `syn` and indexes what the generator asks about:
//!
//! - doc comments of free functions and of methods in `impl` blocks
//! - doc comments of structs and enums, used as controller docs for their methods
//! - doc comments of the enclosing module (inline `mod` docs or the file's `//!` docs), used as
//!   the controller doc of free functions
//! - parameter types of every handler, flattened so `Json<CreateUser>` yields `Json` and
//!   `CreateUser`
//! - which types are structured inputs: structs and enums deriving `Deserialize` or `Validate`

use crate::error::{Error, Result};
use crate::reflection::{ParameterSourceResolver, RouteAction};
use crate::scanner::SourceScanner;
use anyhow::Context;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, ExprLit, FnArg, GenericArgument, Lit, Meta, PathArguments, Signature, Type};

const INPUT_DERIVES: [&str; 2] = ["Deserialize", "Validate"];

#[derive(Debug, Clone, Default)]
struct HandlerEntry {
    doc: Option<String>,
    parameter_types: Vec<String>,
    module_doc: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct TypeEntry {
    doc: Option<String>,
    structured: bool,
}

/// Index of handlers and types found in a set of Rust sources.
#[derive(Debug, Clone, Default)]
pub struct SourceReflector {
    functions: HashMap<String, HandlerEntry>,
    methods: HashMap<(String, String), HandlerEntry>,
    types: HashMap<String, TypeEntry>,
}

impl SourceReflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans and indexes every Rust file under `root`. Files that fail to parse are skipped.
    pub fn from_project(root: &Path, excluded: &[String]) -> anyhow::Result<Self> {
        let scan = SourceScanner::new(root.to_path_buf())
            .exclude(excluded.to_vec())
            .scan()?;

        let mut reflector = Self::new();
        let mut indexed = 0;
        for path in &scan.rust_files {
            match parse_file(path) {
                Ok(file) => {
                    reflector.add_file(&file);
                    indexed += 1;
                }
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        debug!(
            "Indexed {}/{} file(s): {} function(s), {} method(s), {} type(s)",
            indexed,
            scan.rust_files.len(),
            reflector.functions.len(),
            reflector.methods.len(),
            reflector.types.len()
        );
        Ok(reflector)
    }

    /// Parses and indexes source text.
    pub fn add_source(&mut self, source: &str) -> Result<()> {
        let file = syn::parse_file(source)?;
        self.add_file(&file);
        Ok(())
    }

    pub fn add_file(&mut self, file: &syn::File) {
        let mut indexer = Indexer {
            reflector: self,
            module_docs: vec![doc_text(&file.attrs)],
        };
        indexer.visit_file(file);
    }

    fn handler(&self, action: &RouteAction) -> Result<&HandlerEntry> {
        let entry = match &action.class {
            Some(class) => self.methods.get(&(class.clone(), action.method.clone())),
            None => self.functions.get(&action.method),
        };
        entry.ok_or_else(|| Error::reflection(action.to_string(), "handler not found in sources"))
    }
}

impl ParameterSourceResolver for SourceReflector {
    fn method_doc(&self, action: &RouteAction) -> Result<Option<String>> {
        Ok(self.handler(action)?.doc.clone())
    }

    fn controller_doc(&self, action: &RouteAction) -> Result<Option<String>> {
        match &action.class {
            Some(class) => self
                .types
                .get(class)
                .map(|entry| entry.doc.clone())
                .ok_or_else(|| Error::reflection(class.as_str(), "type not found in sources")),
            None => Ok(self.handler(action)?.module_doc.clone()),
        }
    }

    fn parameter_types(&self, action: &RouteAction) -> Result<Vec<String>> {
        Ok(self.handler(action)?.parameter_types.clone())
    }

    fn structured_input_doc(&self, type_name: &str) -> Result<Option<String>> {
        let entry = self
            .types
            .get(type_name)
            .ok_or_else(|| Error::reflection(type_name, "type not found in sources"))?;
        Ok(if entry.structured { entry.doc.clone() } else { None })
    }
}

/// Reads and parses one source file.
pub fn parse_file(path: &Path) -> anyhow::Result<syn::File> {
    debug!("Parsing file: {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    syn::parse_file(&content)
        .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))
}

/// Visitor that fills a [`SourceReflector`]. Function bodies are not entered.
struct Indexer<'r> {
    reflector: &'r mut SourceReflector,
    module_docs: Vec<Option<String>>,
}

impl Indexer<'_> {
    fn handler_entry(&self, attrs: &[Attribute], sig: &Signature) -> HandlerEntry {
        HandlerEntry {
            doc: doc_text(attrs),
            parameter_types: parameter_types(sig),
            module_doc: self.module_docs.last().cloned().flatten(),
        }
    }

    fn add_type(&mut self, name: String, attrs: &[Attribute]) {
        let entry = TypeEntry {
            doc: doc_text(attrs),
            structured: derives(attrs).iter().any(|d| INPUT_DERIVES.contains(&d.as_str())),
        };
        if self.reflector.types.contains_key(&name) {
            debug!("Type {} defined more than once, keeping the first", name);
            return;
        }
        self.reflector.types.insert(name, entry);
    }
}

impl<'ast> Visit<'ast> for Indexer<'_> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let name = node.sig.ident.to_string();
        let entry = self.handler_entry(&node.attrs, &node.sig);
        self.reflector.functions.entry(name).or_insert(entry);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let Type::Path(self_ty) = node.self_ty.as_ref() else {
            return;
        };
        let Some(owner) = self_ty.path.segments.last().map(|s| s.ident.to_string()) else {
            return;
        };

        for item in &node.items {
            if let syn::ImplItem::Fn(method) = item {
                let entry = self.handler_entry(&method.attrs, &method.sig);
                self.reflector
                    .methods
                    .entry((owner.clone(), method.sig.ident.to_string()))
                    .or_insert(entry);
            }
        }
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.add_type(node.ident.to_string(), &node.attrs);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.add_type(node.ident.to_string(), &node.attrs);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_docs.push(doc_text(&node.attrs));
        visit::visit_item_mod(self, node);
        self.module_docs.pop();
    }
}

/// Joins `#[doc]` attributes into one comment.
///
/// `///` lines become separate lines. A block comment (`/** ... */`) arrives as a single
/// multi-line attribute and is rewrapped in block markers so its `*` gutter gets stripped.
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text), ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    match lines.as_slice() {
        [] => None,
        [block] if block.contains('\n') => Some(format!("/*{}*/", block)),
        _ => Some(lines.join("\n")),
    }
}

fn derives(attrs: &[Attribute]) -> Vec<String> {
    let mut names = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                names.push(segment.ident.to_string());
            }
            Ok(())
        });
        if let Err(e) = parsed {
            debug!("Unreadable derive attribute: {}", e);
        }
    }
    names
}

fn parameter_types(sig: &Signature) -> Vec<String> {
    let mut types = Vec::new();
    for input in &sig.inputs {
        if let FnArg::Typed(arg) = input {
            flatten_type(&arg.ty, &mut types);
        }
    }
    types
}

fn flatten_type(ty: &Type, out: &mut Vec<String>) {
    match ty {
        Type::Path(path) => {
            if let Some(segment) = path.path.segments.last() {
                out.push(segment.ident.to_string());
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let GenericArgument::Type(inner) = arg {
                            flatten_type(inner, out);
                        }
                    }
                }
            }
        }
        Type::Reference(reference) => flatten_type(&reference.elem, out),
        Type::Tuple(tuple) => tuple.elems.iter().for_each(|elem| flatten_type(elem, out)),
        Type::Paren(paren) => flatten_type(&paren.elem, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docblock::DocBlock;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
//! @group Health
//! Liveness checks.

use axum::Json;

/// Ping the service.
pub async fn ping() -> &'static str { "pong" }

/**
 * @group Users
 * User management.
 */
pub struct UserController;

impl UserController {
    /// Create a user.
    ///
    /// @bodyParam name string required
    pub async fn store(&self, Json(input): Json<CreateUser>, db: &Db) -> Json<User> {
        fn helper() {}
        todo!()
    }

    pub fn undocumented(&self) {}
}

/// @bodyParam email string required Login email.
#[derive(Debug, serde::Deserialize)]
pub struct CreateUser {
    email: String,
}

/// A user.
#[derive(Serialize)]
pub struct User;

pub mod admin {
    //! @group Admin

    /// Audit log.
    pub fn audit(query: Option<(Page, Filter)>) {}
}
"#;

    fn reflector() -> SourceReflector {
        let mut reflector = SourceReflector::new();
        reflector.add_source(SOURCE).unwrap();
        reflector
    }

    #[test]
    fn test_method_doc_and_controller_doc() {
        let reflector = reflector();
        let store = RouteAction::method("UserController", "store");

        let doc = DocBlock::parse(&reflector.method_doc(&store).unwrap().unwrap());
        assert_eq!(doc.short_description, "Create a user.");
        assert_eq!(doc.tags[0].content, "name string required");

        let controller = DocBlock::parse(&reflector.controller_doc(&store).unwrap().unwrap());
        assert_eq!(controller.tags[0].content, "Users\nUser management.");

        let undocumented = RouteAction::method("UserController", "undocumented");
        assert_eq!(reflector.method_doc(&undocumented).unwrap(), None);
    }

    #[test]
    fn test_parameter_types_are_flattened() {
        let reflector = reflector();

        assert_eq!(
            reflector
                .parameter_types(&RouteAction::method("UserController", "store"))
                .unwrap(),
            vec!["Json", "CreateUser", "Db"]
        );
        assert_eq!(
            reflector.parameter_types(&RouteAction::function("audit")).unwrap(),
            vec!["Option", "Page", "Filter"]
        );
    }

    #[test]
    fn test_structured_inputs() {
        let reflector = reflector();

        let doc = reflector.structured_input_doc("CreateUser").unwrap().unwrap();
        assert!(doc.contains("@bodyParam email"));
        assert_eq!(reflector.structured_input_doc("User").unwrap(), None);
        assert!(reflector.structured_input_doc("Json").is_err());
    }

    #[test]
    fn test_free_functions_use_module_docs() {
        let reflector = reflector();

        let ping = reflector.controller_doc(&RouteAction::function("ping")).unwrap().unwrap();
        assert_eq!(DocBlock::parse(&ping).tags[0].content, "Health\nLiveness checks.");

        let audit = reflector.controller_doc(&RouteAction::function("audit")).unwrap().unwrap();
        assert_eq!(DocBlock::parse(&audit).tags[0].content, "Admin");
    }

    #[test]
    fn test_unknown_handlers() {
        let reflector = reflector();

        assert!(reflector.method_doc(&RouteAction::function("helper")).is_err());
        assert!(reflector
            .controller_doc(&RouteAction::method("Missing", "show"))
            .is_err());
    }

    #[test]
    fn test_from_project_skips_broken_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("handlers.rs"), "/// Health check.\npub fn health() {}").unwrap();
        fs::write(root.join("broken.rs"), "pub fn broken( {").unwrap();

        let reflector = SourceReflector::from_project(root, &[]).unwrap();

        assert_eq!(
            reflector.method_doc(&RouteAction::function("health")).unwrap().as_deref(),
            Some(" Health check.")
        );
    }

    #[test]
    fn test_parse_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.rs");
        fs::write(&path, "struct Missing }").unwrap();

        let err = parse_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse Rust syntax"));

        let err = parse_file(Path::new("/nonexistent/file.rs")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
