// 存储库层
// 单表读写收在各自的 Repository 里；跨表写入要求调用方传入事务句柄

pub mod category;
pub mod food;
pub mod review;
pub mod user;
pub mod verification;

pub use category::CategoryRepository;
pub use food::{FoodRepository, FoodUpdate};
pub use review::{NewReview, ReviewRepository};
pub use user::{ModeratedField, ProfileUpdate, UserRepository};
pub use verification::VerificationRepository;
