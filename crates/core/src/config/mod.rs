//! 配置管理
//!
//! 配置按 默认值 -> TOML文件 -> 环境变量(`CRAWL_` 前缀) 的顺序叠加，
//! 加载完成后逐段校验。

pub mod models;

pub use models::*;
