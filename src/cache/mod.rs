// 缓存模块
// 包含缓存键的生成和操作逻辑

pub mod keys;
pub mod operations;

// 重新导出常用操作，方便其他模块使用
pub use operations::booking::BookingCacheOperations;
pub use operations::captcha::CaptchaCacheOperations;
pub use operations::kv::KvOperations;
