#[tokio::main]
async fn main() {
    if let Err(e) = line_expense_bot_lib::run().await {
        e.log("アプリケーション起動");
        eprintln!("起動に失敗しました: {e}");
        std::process::exit(1);
    }
}
