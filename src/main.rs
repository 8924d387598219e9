// Terminal bootstrap: one process-wide query cache, one API client, and a
// stdin loop driving the holidays view until the user quits.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use holiday_explorer::view::{parse_selection, render_text, HolidaysView, Screen};
use holiday_explorer::{ApiConfig, HolidayQueryCache, OpenHolidaysClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let client = OpenHolidaysClient::new(ApiConfig::default())?;
    let cache = Arc::new(HolidayQueryCache::new());
    let mut view = HolidaysView::new(Arc::new(client), cache);
    info!(country = view.selected(), "holiday explorer started");

    render_until_settled(&view).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") {
            break;
        }

        let options = match view.screen() {
            Screen::Main(main) => main.options,
            _ => Vec::new(),
        };
        match parse_selection(input, &options) {
            Some(code) => {
                view.select(&code);
                render_until_settled(&view).await;
            }
            None => println!("Unknown country code: {input}"),
        }
    }

    Ok(())
}

// Redraw on every query transition until the current selection has settled.
async fn render_until_settled(view: &HolidaysView) {
    let mut last_frame = String::new();
    loop {
        view.refresh();
        let frame = render_text(&view.screen());
        if frame != last_frame {
            print!("{frame}");
            last_frame = frame;
        }
        if view.is_settled() {
            return;
        }
        view.changed().await;
    }
}

fn prompt() -> Result<()> {
    print!("\nSelect a country code (q to quit): ");
    io::stdout().flush()?;
    Ok(())
}
