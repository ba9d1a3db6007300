use chrono::NaiveDate;

pub fn format_number_with_commas(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && text.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_money(value: f64) -> String {
    format!("R$ {}", format_number_with_commas(value, 2))
}

pub fn format_money_whole(value: f64) -> String {
    format!("R$ {}", format_number_with_commas(value, 0))
}

pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

pub fn format_count(value: f64) -> String {
    format_number_with_commas(value, 0)
}

pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Width of a horizontal bar relative to the largest value, as a CSS percentage.
pub fn bar_width_pct(value: f64, max: f64) -> f64 {
    if max <= 0.0 || value <= 0.0 || !value.is_finite() {
        0.0
    } else {
        (value / max * 100.0).min(100.0)
    }
}
