use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::Span;
use toml_edit::{Document, Item, Table};

/// The `Cargo.toml` of the crate a macro is expanding in.
///
/// Generated code has to name runtime crates by a path that resolves from
/// the caller. A caller may depend on `vc_schema` directly or only on the
/// `vc_pack` facade, which re-exports each `vc_*` crate under its short name.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.crate_path("vc_schema"));
/// ```
///
/// # Resolution rules
///
/// 1. `name` listed in `dependencies`: `::name`.
/// 2. `name` starts with `vc_` and `vc_pack` is listed: `::vc_pack::short`
///    (`vc_schema` becomes `::vc_pack::schema`).
/// 3. Both again for `dev-dependencies`.
/// 4. Otherwise `::name`. A crate naming itself this way needs
///    `extern crate self as name;` at its root.
#[derive(Debug)]
pub struct Manifest {
    document: Option<Document<Box<str>>>,
    modified: Option<SystemTime>,
}

const FACADE_NAME: &str = "vc_pack";
const CRATE_PREFIX: &str = "vc_";

impl Manifest {
    fn path() -> Option<PathBuf> {
        let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
        path.push("Cargo.toml");
        Some(path)
    }

    fn load(path: &Path) -> Self {
        let document = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| Document::parse(text.into_boxed_str()).ok());
        Self {
            document,
            modified: Self::modified(path),
        }
    }

    fn modified(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn absolute(segments: &[&str]) -> syn::Path {
        let mut path = syn::Path {
            leading_colon: Some(Default::default()),
            segments: Default::default(),
        };
        for segment in segments {
            path.segments
                .push(syn::Ident::new(segment, Span::call_site()).into());
        }
        path
    }

    fn find_in(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::absolute(&[name]));
        }
        let short = name.strip_prefix(CRATE_PREFIX)?;
        deps.contains_key(FACADE_NAME)
            .then(|| Self::absolute(&[FACADE_NAME, short]))
    }

    /// Path to the crate `name`, as seen from the caller.
    pub fn crate_path(&self, name: &str) -> syn::Path {
        let Some(document) = &self.document else {
            return Self::absolute(&[name]);
        };
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .find_map(|table| match document.get(table) {
                Some(Item::Table(deps)) => Self::find_in(deps, name),
                _ => None,
            })
            .unwrap_or_else(|| Self::absolute(&[name]))
    }

    /// Runs `func` with the caller's manifest.
    ///
    /// Parsed manifests are cached per path and reloaded when the file
    /// changes. A missing or unreadable manifest behaves as one without
    /// dependencies.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(path) = Self::path() else {
            return func(&Manifest {
                document: None,
                modified: None,
            });
        };

        let cached = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(manifest) = cached.get(&path)
            && manifest.modified.is_some()
            && manifest.modified == Self::modified(&path)
        {
            return func(manifest);
        }
        drop(cached);

        let manifest = Self::load(&path);
        let result = func(&manifest);
        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }
}

#[cfg(test)]
mod tests {
    use toml_edit::Document;

    use super::Manifest;

    fn manifest(text: &str) -> Manifest {
        Manifest {
            document: Some(Document::parse(Box::from(text)).unwrap()),
            modified: None,
        }
    }

    fn render(path: syn::Path) -> String {
        path.segments
            .iter()
            .map(|s| s.ident.to_string())
            .fold(String::new(), |acc, s| acc + "::" + &s)
    }

    #[test]
    fn direct_dependency() {
        let m = manifest("[dependencies]\nvc_schema = \"0.0.1\"\n");
        assert_eq!(render(m.crate_path("vc_schema")), "::vc_schema");
    }

    #[test]
    fn through_facade() {
        let m = manifest("[dev-dependencies]\nvc_pack = { path = \"..\" }\n");
        assert_eq!(render(m.crate_path("vc_schema")), "::vc_pack::schema");
    }

    #[test]
    fn fallback() {
        let m = manifest("[package]\nname = \"x\"\n");
        assert_eq!(render(m.crate_path("vc_schema")), "::vc_schema");
    }
}
