//! 按类型缓存的模式
//!
//! 模式构建是确定且幂等的，因此不需要在构建期间加锁：并发首次构建时
//! 各线程各自构建，写入时只保留第一个发布的结果，落败的构建直接丢弃。

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::{ExtraMsgBody, TypeSchema};

type ErasedSchema = Arc<dyn Any + Send + Sync>;

/// 模式缓存
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<TypeId, ErasedSchema>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取 `T` 的模式，首次使用时构建
    pub fn get_or_build<T: ExtraMsgBody>(&self) -> Arc<TypeSchema<T>> {
        if let Some(schema) = self.get::<T>() {
            return schema;
        }

        let built = Arc::new(TypeSchema::<T>::build());
        tracing::debug!(
            record = type_name::<T>(),
            fields = built.len(),
            "schema built"
        );

        let erased: ErasedSchema = built.clone();
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        let published = schemas.entry(TypeId::of::<T>()).or_insert(erased);
        Arc::clone(published)
            .downcast::<TypeSchema<T>>()
            .unwrap_or(built)
    }

    /// 已发布的模式
    pub fn get<T: ExtraMsgBody>(&self) -> Option<Arc<TypeSchema<T>>> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas
            .get(&TypeId::of::<T>())
            .and_then(|schema| Arc::clone(schema).downcast::<TypeSchema<T>>().ok())
    }

    /// 已缓存的类型数量
    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL: OnceLock<SchemaCache> = OnceLock::new();

/// 进程级模式缓存中 `T` 的模式
pub fn schema_for<T: ExtraMsgBody>() -> Arc<TypeSchema<T>> {
    GLOBAL.get_or_init(SchemaCache::new).get_or_build::<T>()
}
