//! Fixed-width text table for a [`LocationInfo`].

use chrono::{DateTime, FixedOffset, Utc};
use countryinfo_core::{LocationInfo, NewsItem};
use rust_decimal::{Decimal, RoundingStrategy};

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

pub struct Renderer<'a> {
    info: &'a LocationInfo,
}

impl<'a> Renderer<'a> {
    pub fn new(info: &'a LocationInfo) -> Self {
        Self { info }
    }

    /// Header block of country and weather facts, then one block per news item.
    pub fn render(&self) -> Vec<String> {
        let rows = self.header_rows();

        let first_width = rows.iter().map(|(key, _)| width(key)).max().unwrap_or(0) + 1;
        let second_width = rows.iter().map(|(_, value)| width(value)).max().unwrap_or(0) + 1;
        let separator = "-".repeat(first_width + second_width + 3);

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(separator.clone());
        lines.extend(
            rows.iter()
                .map(|(key, value)| format!("|{key:<first_width$}|{value:>second_width$}|")),
        );
        lines.push(separator);
        lines.extend(self.format_news(&self.info.news, first_width, second_width));

        lines
    }

    fn header_rows(&self) -> Vec<(&'static str, String)> {
        let country = &self.info.location;
        let weather = &self.info.weather;

        vec![
            ("Страна", country.name.clone()),
            ("Столица", country.capital.clone()),
            ("Регион", country.subregion.clone()),
            ("Языки", self.format_languages()),
            ("Население страны", self.format_population()),
            ("Курсы валют", self.format_currency_rates()),
            ("Площадь страны", optional(country.area)),
            ("Широта", optional(country.latitude)),
            ("Долгота", optional(country.longitude)),
            ("Погода", weather.temp.to_string()),
            ("Время", local_time(weather.observed_at, weather.timezone)),
            ("Часовой пояс", weather.timezone.to_string()),
            ("Описание погоды", weather.description.clone()),
            ("Видимость", optional(weather.visibility)),
            ("Влажность", weather.humidity.to_string()),
            ("Скорость ветра", weather.wind_speed.to_string()),
            ("Давление", weather.pressure.to_string()),
        ]
    }

    pub fn format_languages(&self) -> String {
        self.info
            .location
            .languages
            .iter()
            .map(|lang| format!("{} ({})", lang.name, lang.native_name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn format_population(&self) -> String {
        group_thousands(self.info.location.population)
    }

    pub fn format_currency_rates(&self) -> String {
        self.info
            .currency_rates
            .iter()
            .map(|(code, rate)| format!("{code} = {} руб.", round_half_up(*rate)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Rows for every news item, each item closed by a dash line.
    pub fn format_news(
        &self,
        news: &[NewsItem],
        first_width: usize,
        second_width: usize,
    ) -> Vec<String> {
        let separator = "-".repeat(first_width + second_width + 3);
        let mut lines = Vec::new();

        for item in news {
            let published = item.published_at.format(DATE_FORMAT).to_string();
            let fields = [
                ("Источник", item.source.as_str()),
                ("Новость", item.title.as_str()),
                ("Ссылка", item.url.as_str()),
                ("Дата", published.as_str()),
                ("Описание", item.description.as_deref().unwrap_or_default()),
                ("Текст", item.content.as_deref().unwrap_or_default()),
            ];

            for (key, value) in fields {
                lines.extend(self.format_news_line(key, value, first_width, second_width));
            }
            lines.push(separator.clone());
        }

        lines
    }

    /// One labelled row, wrapped onto extra lines when `value` is wider than its column.
    pub fn format_news_line(
        &self,
        key: &str,
        value: &str,
        first_width: usize,
        second_width: usize,
    ) -> Vec<String> {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() || second_width == 0 {
            return vec![format!("|{key:<first_width$}|{value:>second_width$}|")];
        }

        chars
            .chunks(second_width)
            .enumerate()
            .map(|(i, chunk)| {
                let label = if i == 0 { key } else { "" };
                let chunk: String = chunk.iter().collect();
                format!("|{label:<first_width$}|{chunk:>second_width$}|")
            })
            .collect()
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn local_time(at: DateTime<Utc>, offset_hours: f64) -> String {
    match FixedOffset::east_opt((offset_hours * 3600.0).round() as i32) {
        Some(offset) => at.with_timezone(&offset).format(DATE_FORMAT).to_string(),
        None => at.format(DATE_FORMAT).to_string(),
    }
}

/// `145934462` -> `145.934.462`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }

    out
}

/// Two decimals, ties away from zero, from the exact binary value of `rate`.
fn round_half_up(rate: f64) -> String {
    match Decimal::from_f64_retain(rate) {
        Some(d) => format!("{:.2}", d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)),
        None => format!("{rate:.2}"),
    }
}
