//! 可热替换的共享型号数据库
//! 读多写少：查询方取快照后无锁查询，重新加载时整体替换

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use super::resolved::ResolvedModel;
use super::resolver::DriveDb;
use crate::config::GlobalConfig;
use crate::error::RsDriveDbResult;

/// 共享型号数据库句柄
#[derive(Debug, Clone, Default)]
pub struct SharedDriveDb {
    current: Arc<RwLock<Arc<DriveDb>>>,
}

impl SharedDriveDb {
    pub fn new(db: DriveDb) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(db))),
        }
    }

    /// 获取当前数据库快照
    pub fn snapshot(&self) -> Arc<DriveDb> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// 替换当前数据库，返回旧的数据库
    pub fn replace(&self, db: DriveDb) -> Arc<DriveDb> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(db))
    }

    /// 按配置重新加载；失败时保留原数据库
    pub fn reload(&self, config: &GlobalConfig) -> RsDriveDbResult<Arc<DriveDb>> {
        let db = DriveDb::open(config).inspect_err(|e| warn!("型号数据库重新加载失败，继续使用旧数据：{}", e))?;
        info!("型号数据库已重新加载，条目数：{}", db.len());
        Ok(self.replace(db))
    }

    /// 异步重新加载；失败时保留原数据库
    pub async fn reload_async(&self, config: &GlobalConfig) -> RsDriveDbResult<Arc<DriveDb>> {
        let db = DriveDb::open_async(config)
            .await
            .inspect_err(|e| warn!("型号数据库重新加载失败，继续使用旧数据：{}", e))?;
        info!("型号数据库已重新加载，条目数：{}", db.len());
        Ok(self.replace(db))
    }

    pub fn lookup_drive(&self, ident: &[u8]) -> ResolvedModel {
        self.snapshot().lookup_drive(ident)
    }
}
