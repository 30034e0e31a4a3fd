//! 标签目录：进程级只读清单 + 子串搜索。
//!
//! 清单在启动时构造一次（内置清单或外部文件），之后只读，
//! 可被任意多个并发请求共享而无需加锁。

use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 搜索、列表接口单次最多返回的条数。
pub const RESULT_LIMIT: usize = 20;

/// 搜索关键字的最短长度（按字符计，不去除空白）。
pub const MIN_FILTER_LEN: usize = 2;

const BUILTIN_TAGS: &str = include_str!("../data/tags.txt");

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read tag catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tag catalog {0} is empty")]
    Empty(String),
}

/// 不可变标签名清单，保持加载顺序。
#[derive(Debug, Clone)]
pub struct TagCatalog {
    names: Arc<[String]>,
}

impl TagCatalog {
    /// 编译期内置的站点标签清单。
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_TAGS)
    }

    /// 从换行分隔的文本文件加载；空行与 `#` 开头的行被忽略。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::parse(&text);
        if catalog.is_empty() {
            return Err(DirectoryError::Empty(path.display().to_string()));
        }
        info!(
            target: "pitag.directory",
            path = %path.display(),
            tags = catalog.len(),
            "catalog_loaded"
        );
        Ok(catalog)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    fn parse(text: &str) -> Self {
        Self::from_names(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 标签目录查询。
#[derive(Debug, Clone)]
pub struct TagDirectory {
    catalog: TagCatalog,
}

impl TagDirectory {
    pub fn new(catalog: TagCatalog) -> Self {
        Self { catalog }
    }

    /// 不区分大小写的子串搜索，结果按字典序升序，最多 [`RESULT_LIMIT`] 条。
    ///
    /// 关键字全为空白或短于 [`MIN_FILTER_LEN`] 时返回空列表。
    /// 关键字按原样匹配，空格是有效字符（如 `" D"`）。
    pub fn search(&self, filter: &str) -> Vec<String> {
        if filter.trim().is_empty() || filter.chars().count() < MIN_FILTER_LEN {
            return Vec::new();
        }
        let needle = filter.to_lowercase();
        let mut matches: Vec<String> = self
            .catalog
            .names()
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort();
        matches.truncate(RESULT_LIMIT);
        matches
    }

    /// 按加载顺序返回前 [`RESULT_LIMIT`] 条。
    pub fn list_all(&self) -> Vec<String> {
        self.catalog
            .names()
            .iter()
            .take(RESULT_LIMIT)
            .cloned()
            .collect()
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }
}
