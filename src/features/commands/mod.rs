/// チャットコマンド機能モジュール
///
/// メッセージ本文の解析（parser）、返信文言（messages）、
/// ストアとレポートを呼び出して返信文を作る処理（dispatcher）を含みます。
pub mod dispatcher;
pub mod messages;
pub mod parser;

pub use dispatcher::CommandDispatcher;
pub use parser::{parse_command, Command};
