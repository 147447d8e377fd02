use std::env;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use led_gauge::{GaugeCommand, GaugeConfig, LedGauge, Orientation, SettingValue};
use rand::Rng;
use tracing_subscriber::EnvFilter;

struct Args {
    config: GaugeConfig,
    random: bool,
}

/// Ordered, finite bounds for `--range`.
fn parse_range(x: &str, y: &str) -> Option<(f64, f64)> {
    let x = x.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let y = y.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((x.min(y), x.max(y)))
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut min_value = 0.0;
    let mut max_value = 100.0;
    let mut title = "LED Gauge".to_string();
    let mut orientation = Orientation::Vertical;
    let mut gap: Option<SettingValue> = None;
    let mut size: Option<SettingValue> = None;
    let mut count: Option<SettingValue> = None;
    let mut font_data = None;
    let mut random = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--range" => {
                if let (Some(x), Some(y)) = (args.next(), args.next()) {
                    match parse_range(&x, &y) {
                        Some((lower, upper)) => {
                            min_value = lower;
                            max_value = upper;
                        }
                        None => tracing::warn!(%x, %y, "ignoring non-numeric or infinite range"),
                    }
                }
            }
            "--title" => {
                if let Some(t) = args.next() {
                    title = t;
                }
            }
            "--gap" => gap = args.next().map(SettingValue::from),
            "--size" => size = args.next().map(SettingValue::from),
            "--count" => count = args.next().map(SettingValue::from),
            "--horizontal" => orientation = Orientation::Horizontal,
            "--font" => {
                if let Some(path) = args.next() {
                    font_data = Some(std::fs::read(path)?);
                }
            }
            "--random" => random = true,
            other => tracing::warn!(arg = other, "ignoring unknown argument"),
        }
    }

    let (window_width, window_height) = match orientation {
        Orientation::Vertical => (160, 400),
        Orientation::Horizontal => (480, 160),
    };
    let config = GaugeConfig::builder()
        .title(title)
        .range((min_value, max_value))
        .orientation(orientation)
        .window_width(window_width)
        .window_height(window_height)
        .maybe_gap(gap)
        .maybe_size(size)
        .maybe_count(count)
        .maybe_font_data(font_data)
        .build();
    Ok(Args { config, random })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Args { config, random } = parse_args()?;
    let (min_value, max_value) = config.range;
    let mut gauge = LedGauge::new(config);
    let (sender, receiver) = mpsc::channel();

    if random {
        // Drift towards a new random target now and then
        thread::spawn(move || {
            let mut rng = rand::rng();
            let mut value = (min_value + max_value) / 2.0;
            let mut target = value;
            loop {
                if rng.random_range(0.0..1.0) < 0.05 {
                    target = rng.random_range(min_value..=max_value);
                }
                value += (target - value) * 0.1;
                if sender.send(GaugeCommand::SetValue(value)).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(30));
            }
        });
    } else {
        // One number per stdin line; `gap=`, `size=` and `count=` lines retune the segments
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines().map_while(Result::ok) {
                let command = match line.trim().split_once('=') {
                    Some(("gap", v)) => GaugeCommand::SetGap(v.trim().into()),
                    Some(("size", v)) => GaugeCommand::SetSize(v.trim().into()),
                    Some(("count", v)) => GaugeCommand::SetCount(v.trim().into()),
                    _ => match line.trim().parse::<f64>() {
                        Ok(value) => GaugeCommand::SetValue(value),
                        Err(_) => continue,
                    },
                };
                if sender.send(command).is_err() {
                    break;
                }
            }
        });
    }

    gauge.show_with_commands(receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_must_be_finite() {
        assert_eq!(parse_range("10", "-5"), Some((-5.0, 10.0)));
        assert_eq!(parse_range("0", "inf"), None);
        assert_eq!(parse_range("-infinity", "5"), None);
        assert_eq!(parse_range("NaN", "5"), None);
        assert_eq!(parse_range("low", "5"), None);
    }
}
