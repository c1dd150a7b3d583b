// 数据库行结构
// 列名与表结构一一对应，出站序列化统一跳过密码等敏感列

pub mod category;
pub mod food;
pub mod review;
pub mod user;
pub mod verification;

pub use category::*;
pub use food::*;
pub use review::*;
pub use user::*;
pub use verification::*;
