//! Plain-text rendering of command replies and scheduled messages.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use feeds::{CryptoPrices, UsdRates, Weather};
use std::fmt::Write;
use storage::SenderCount;

pub const NO_DATA: &str = "Нет данных";

/// Prices above 1000 get thousands separators, sub-unit prices four decimals, the rest two.
pub fn format_price(value: f64) -> String {
    if value > 1000.0 {
        group_thousands(&format!("{:.2}", value))
    } else if value < 1.0 {
        format!("{:.4}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));
    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(fixed.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// "1д 2ч 3м 4с"; leading zero units are omitted.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.num_seconds().max(0);
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        total % 86_400 / 3600,
        total % 3600 / 60,
        total % 60,
    );
    let mut out = String::new();
    if days > 0 {
        let _ = write!(out, "{}д ", days);
    }
    if days > 0 || hours > 0 {
        let _ = write!(out, "{}ч ", hours);
    }
    if days > 0 || hours > 0 || minutes > 0 {
        let _ = write!(out, "{}м ", minutes);
    }
    let _ = write!(out, "{}с", seconds);
    out
}

pub fn timestamp_line(now: DateTime<Tz>) -> String {
    format!("⏱ Данные на {}", now.format("%d.%m.%Y %H:%M"))
}

/// `/pogoda` reply.
pub fn weather_report(rows: &[(String, Option<Weather>)]) -> String {
    let mut out = String::from("🌤 Погода сейчас:\n\n");
    for (label, weather) in rows {
        match weather {
            Some(w) => {
                let _ = writeln!(out, "🏙 {}: {}", label, w);
            }
            None => {
                let _ = writeln!(out, "🏙 {}: {}", label, NO_DATA);
            }
        }
    }
    out.trim_end().to_string()
}

/// `/byn` and `/rub` reply: the rate and its inverse.
pub fn rate_report(code: &str, usd_rate: f64, now: DateTime<Tz>) -> String {
    format!(
        "💵 Курс USD/{code}:\n\n1 USD = {:.4} {code}\n1 {code} = {:.6} USD\n\n{}",
        usd_rate,
        1.0 / usd_rate,
        timestamp_line(now),
        code = code
    )
}

/// `/wld` reply: WLD in USD, BYN and RUB.
pub fn wld_report(wld_usd: f64, rates: &UsdRates, now: DateTime<Tz>) -> String {
    format!(
        "💰 Курс WorldCoin (WLD):\n\n📈 USD: ${:.4}\n📈 BYN: {:.4} BYN\n📈 RUB: {:.4} RUB\n\n{}",
        wld_usd,
        wld_usd * rates.byn,
        wld_usd * rates.rub,
        timestamp_line(now)
    )
}

/// Everything the morning message is made of; missing parts render as "no data".
#[derive(Debug, Clone)]
pub struct MorningReport {
    pub weather: Vec<(String, Option<Weather>)>,
    pub rates: Option<UsdRates>,
    pub crypto: Option<CryptoPrices>,
    pub wish: String,
}

fn coin_line(out: &mut String, icon_name: &str, usd: Option<f64>, byn_rate: Option<f64>) {
    match (usd, byn_rate) {
        (Some(usd), Some(rate)) => {
            let _ = writeln!(
                out,
                "{}: ${} USD | {} BYN",
                icon_name,
                format_price(usd),
                format_price(usd * rate)
            );
        }
        (Some(usd), None) => {
            let _ = writeln!(out, "{}: ${} USD", icon_name, format_price(usd));
        }
        (None, _) => {
            let _ = writeln!(out, "{}: {}", icon_name, NO_DATA);
        }
    }
}

impl MorningReport {
    pub fn render(&self) -> String {
        let mut out = String::from("Родные мои, всем доброе утро и хорошего дня! ❤️\n\n");
        out.push_str("Положняк по погоде:\n");
        for (label, weather) in &self.weather {
            let data = weather
                .as_ref()
                .map(|w| w.to_string())
                .unwrap_or_else(|| NO_DATA.to_string());
            let _ = writeln!(out, "🌥 {}: {}", label, data);
        }

        out.push_str("\nПоложняк по курсам:\n");
        match &self.rates {
            Some(r) => {
                let _ = writeln!(out, "💵 USD/BYN: {} BYN", format_price(r.byn));
                let _ = writeln!(out, "💵 USD/RUB: {} RUB", format_price(r.rub));
            }
            None => {
                let _ = writeln!(out, "💵 USD/BYN: {}", NO_DATA);
                let _ = writeln!(out, "💵 USD/RUB: {}", NO_DATA);
            }
        }
        let byn = self.rates.map(|r| r.byn);
        coin_line(&mut out, "₿ BTC", self.crypto.map(|c| c.btc_usd), byn);
        coin_line(&mut out, "🌍 WLD", self.crypto.map(|c| c.wld_usd), byn);

        out.push('\n');
        out.push_str(self.wish.trim());
        out
    }
}

/// One block of `/chatstats`: total and a numbered list of top senders.
pub fn senders_block(title: &str, total: i64, top: &[SenderCount]) -> String {
    let mut out = format!("{}:\nВсего сообщений: {}\n", title, total);
    if top.is_empty() {
        out.push_str("Нет сообщений\n");
    }
    for (i, sender) in top.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} сообщений",
            i + 1,
            sender.display_name,
            sender.message_count
        );
    }
    out
}
