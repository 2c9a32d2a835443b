// src/catalog/mod.rs

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::config::StoreConfig;
use crate::error::{DataError, Result};

/// Built-in logical name → path (relative to the curated root) table.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("證券屬性資料表", "證券屬性資料/證券屬性資料表"),
    ("月營收", "公司營運資料/月營收"),
    ("股利政策", "公司營運資料/股利政策"),
    ("資本形成", "公司營運資料/資本形成"),
    ("集保庫存", "交易屬性資料/集保庫存"),
    ("三大法人_融資券_當沖", "交易屬性資料/三大法人_融資券_當沖"),
    ("股價交易資訊", "交易屬性資料/股價交易資訊"),
    ("股票日交易註記資訊", "交易屬性資料/股票日交易註記資訊"),
    ("交易日期表", "交易屬性資料/交易日期表"),
    ("會計師簽證財務資料", "財務屬性資料/會計師簽證財務資料"),
    ("公司自結數", "財務屬性資料/公司自結數"),
    ("合併收購", "法人機構專屬資料/合併收購"),
    ("董事長與高階主管變動事件", "法人機構專屬資料/董事長與高階主管變動事件"),
    ("全面改選統計", "法人機構專屬資料/全面改選統計"),
    ("董監全體持股狀況", "法人機構專屬資料/董監全體持股狀況"),
    ("庫藏股實施事件簿", "法人機構專屬資料/庫藏股實施事件簿"),
    ("董監申報轉讓_未轉讓", "法人機構專屬資料/董監申報轉讓_未轉讓"),
    ("董監申報轉讓_轉讓", "法人機構專屬資料/董監申報轉讓_轉讓"),
    ("私募應募人與公司的關係", "法人機構專屬資料/私募應募人與公司的關係"),
    ("月營收_法人機構專屬版本", "法人機構專屬資料/月營收_法人機構專屬版本"),
];

/// Closed, immutable mapping from logical dataset names to relative paths.
/// Keeps definition order for listing.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<(String, PathBuf)>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// The catalog shipped with the data lake layout.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_ENTRIES.iter().copied())
    }

    /// Build a catalog from `(name, relative path)` pairs. A repeated name
    /// keeps its first position and takes the last path.
    pub fn from_entries<I, N, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<PathBuf>,
    {
        let mut out: Vec<(String, PathBuf)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (name, rel) in entries {
            let name = name.into();
            let rel = rel.into();
            match index.get(&name) {
                Some(&i) => out[i].1 = rel,
                None => {
                    index.insert(name.clone(), out.len());
                    out.push((name, rel));
                }
            }
        }
        Self {
            entries: out,
            index,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.index.get(name).map(|&i| self.entries[i].1.as_path())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Turns logical names into absolute locations under the two roots.
/// Pure path construction: nothing here touches the filesystem.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    catalog: Catalog,
    load_root: PathBuf,
    get_root: PathBuf,
}

impl CatalogResolver {
    pub fn new(catalog: Catalog, load_root: impl Into<PathBuf>, get_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            load_root: load_root.into(),
            get_root: get_root.into(),
        }
    }

    /// Built-in catalog over the roots from `config`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(Catalog::builtin(), config.load_root(), config.get_root())
    }

    /// Curated directory for a catalog name.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        self.catalog
            .get(name)
            .map(|rel| self.get_root.join(rel))
            .ok_or_else(|| DataError::UnknownDataset {
                name: name.to_string(),
            })
    }

    /// `<load root>/<name>`, bypassing the catalog.
    pub fn resolve_raw(&self, name: &str) -> PathBuf {
        self.load_root.join(name)
    }

    /// `<load root>/<name>/<name>.parquet`, the single-file raw layout.
    pub fn raw_file(&self, name: &str) -> PathBuf {
        self.resolve_raw(name).join(format!("{}.parquet", name))
    }

    pub fn names(&self) -> Vec<String> {
        self.catalog.names().map(str::to_string).collect()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn load_root(&self) -> &Path {
        &self.load_root
    }

    pub fn get_root(&self) -> &Path {
        &self.get_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_every_entry() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.names().next(), Some("證券屬性資料表"));
        assert_eq!(
            catalog.get("月營收"),
            Some(Path::new("公司營運資料/月營收"))
        );
    }

    #[test]
    fn resolve_joins_curated_root() {
        let resolver = CatalogResolver::new(Catalog::builtin(), "/load", "/get");
        assert_eq!(
            resolver.resolve("股價交易資訊").unwrap(),
            PathBuf::from("/get/交易屬性資料/股價交易資訊")
        );
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let resolver = CatalogResolver::new(Catalog::builtin(), "/load", "/get");
        match resolver.resolve("not-a-dataset") {
            Err(DataError::UnknownDataset { name }) => assert_eq!(name, "not-a-dataset"),
            other => panic!("expected UnknownDataset, got {:?}", other),
        }
    }

    #[test]
    fn raw_paths_ignore_catalog() {
        let resolver = CatalogResolver::new(Catalog::from_entries(Vec::<(String, String)>::new()), "/load", "/get");
        assert_eq!(resolver.resolve_raw("收盤價"), PathBuf::from("/load/收盤價"));
        assert_eq!(
            resolver.raw_file("收盤價"),
            PathBuf::from("/load/收盤價/收盤價.parquet")
        );
    }

    #[test]
    fn repeated_names_keep_first_position() {
        let catalog = Catalog::from_entries([("a", "x"), ("b", "y"), ("a", "z")]);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(catalog.get("a"), Some(Path::new("z")));
    }
}
