//! 推論ステージ
//!
//! - vision: 2段階推論Step1（画像 → 説明文、失敗時はセンチネル）
//! - reasoning: 2段階推論Step2（説明文 → 解答、失敗時は既定解答）
//! - direct: 1段階推論（画像 → 解答、失敗時は空文字）

pub mod direct;
pub mod reasoning;
pub mod vision;

pub use direct::ask_direct;
pub use reasoning::reason_with_text;
pub use vision::understand_image;
