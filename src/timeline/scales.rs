//! Coordinate mappings for the scatter plot.
//!
//! - `TimeScale`: authored instant → x, with "nice" calendar-aligned bounds
//! - `HourScale`: hour of day → y, optionally wrapped around a day-start hour
//! - `RadiusScale`: total lines → radius (square-root)
//! - `ColorScale`: hour of day → color, cyclic so midnight is continuous
//!
//! `Scales::fit` rebuilds all four from the visible commits. Only the x and
//! radius domains depend on the data; y and color describe the diurnal cycle.

use std::f64::consts::PI;

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};

use crate::models::{AxisTick, Point};
use crate::timeline::aggregate::Commit;
use crate::timeline::config::{PlotArea, ViewConfig};

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Approximate number of x-axis ticks to aim for.
const TICK_COUNT: usize = 10;

/// Linear map from a domain interval onto a range interval.
///
/// A zero-width domain maps everything to the middle of the range instead
/// of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl Linear {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (value - r0) / (r1 - r0) * (d1 - d0)
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

/// Calendar interval used for nice bounds and axis ticks, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickInterval {
    Millis(i64),
    Seconds(i64),
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks,
    Months(u32),
    Years(i32),
}

const INTERVALS: [(TickInterval, i64); 18] = [
    (TickInterval::Seconds(1), SECOND),
    (TickInterval::Seconds(5), 5 * SECOND),
    (TickInterval::Seconds(15), 15 * SECOND),
    (TickInterval::Seconds(30), 30 * SECOND),
    (TickInterval::Minutes(1), MINUTE),
    (TickInterval::Minutes(5), 5 * MINUTE),
    (TickInterval::Minutes(15), 15 * MINUTE),
    (TickInterval::Minutes(30), 30 * MINUTE),
    (TickInterval::Hours(1), HOUR),
    (TickInterval::Hours(3), 3 * HOUR),
    (TickInterval::Hours(6), 6 * HOUR),
    (TickInterval::Hours(12), 12 * HOUR),
    (TickInterval::Days(1), DAY),
    (TickInterval::Days(2), 2 * DAY),
    (TickInterval::Weeks, WEEK),
    (TickInterval::Months(1), MONTH),
    (TickInterval::Months(3), 3 * MONTH),
    (TickInterval::Years(1), YEAR),
];

/// 1, 2 or 5 times a power of ten, close to `span / count`.
fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start).abs() / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

fn from_millis(ms: i64, fallback: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(fallback)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

impl TickInterval {
    /// Picks the interval whose step is closest to `span / count`.
    pub fn choose(start: DateTime<Utc>, end: DateTime<Utc>, count: usize) -> Self {
        let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis());
        let target = (end_ms - start_ms).abs() as f64 / count.max(1) as f64;
        let i = INTERVALS.partition_point(|&(_, step)| step as f64 <= target);

        if i == INTERVALS.len() {
            let years = tick_step(
                start_ms as f64 / YEAR as f64,
                end_ms as f64 / YEAR as f64,
                count,
            );
            return TickInterval::Years(years.max(1.0).round() as i32);
        }
        if i == 0 {
            let millis = tick_step(start_ms as f64, end_ms as f64, count);
            return TickInterval::Millis(millis.max(1.0).round() as i64);
        }

        let (lower, lower_step) = INTERVALS[i - 1];
        let (upper, upper_step) = INTERVALS[i];
        if target / (lower_step as f64) < upper_step as f64 / target {
            lower
        } else {
            upper
        }
    }

    fn fixed_millis(&self) -> Option<i64> {
        match *self {
            TickInterval::Millis(n) => Some(n),
            TickInterval::Seconds(n) => Some(n * SECOND),
            TickInterval::Minutes(n) => Some(n * MINUTE),
            TickInterval::Hours(n) => Some(n * HOUR),
            _ => None,
        }
    }

    pub fn floor(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(unit) = self.fixed_millis() {
            let ms = t.timestamp_millis();
            return from_millis(ms.div_euclid(unit) * unit, t);
        }

        let date = t.date_naive();
        let floored = match *self {
            TickInterval::Days(n) => date - Duration::days(date.day0() as i64 % n),
            TickInterval::Weeks => {
                date - Duration::days(date.weekday().num_days_from_sunday() as i64)
            }
            TickInterval::Months(n) => {
                let month0 = date.month0() - date.month0() % n;
                NaiveDate::from_ymd_opt(date.year(), month0 + 1, 1).unwrap_or(date)
            }
            TickInterval::Years(n) => {
                let year = date.year() - date.year().rem_euclid(n.max(1));
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date)
            }
            _ => date,
        };
        midnight(floored)
    }

    pub fn offset(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(unit) = self.fixed_millis() {
            return t + Duration::milliseconds(unit);
        }
        match *self {
            TickInterval::Days(n) => t + Duration::days(n),
            TickInterval::Weeks => t + Duration::days(7),
            TickInterval::Months(n) => t.checked_add_months(Months::new(n)).unwrap_or(t),
            TickInterval::Years(n) => t
                .checked_add_months(Months::new(12 * n.max(1) as u32))
                .unwrap_or(t),
            _ => t,
        }
    }

    pub fn ceil(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let floored = self.floor(t);
        if floored == t { t } else { self.offset(floored) }
    }

    /// strftime pattern for tick labels at this granularity.
    pub fn label_format(&self) -> &'static str {
        match self {
            TickInterval::Millis(_) | TickInterval::Seconds(_) => "%H:%M:%S",
            TickInterval::Minutes(_) | TickInterval::Hours(_) => "%H:%M",
            TickInterval::Days(_) | TickInterval::Weeks => "%b %d",
            TickInterval::Months(_) => "%b %Y",
            TickInterval::Years(_) => "%Y",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    linear: Linear,
    interval: TickInterval,
}

impl TimeScale {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, range: (f64, f64)) -> Self {
        Self {
            start,
            end,
            linear: Linear::new(
                (start.timestamp_millis() as f64, end.timestamp_millis() as f64),
                range,
            ),
            interval: TickInterval::choose(start, end, TICK_COUNT),
        }
    }

    /// Extends the domain outward to interval boundaries. A zero-width domain
    /// first grows to the UTC day containing it.
    pub fn nice(self) -> Self {
        let (mut start, mut end) = (self.start, self.end);
        if start == end {
            start = TickInterval::Days(1).floor(start);
            end = TickInterval::Days(1).offset(start);
        }
        let interval = TickInterval::choose(start, end, TICK_COUNT);
        Self::new(interval.floor(start), interval.ceil(end), self.linear.range())
    }

    pub fn map<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> f64 {
        self.linear.map(t.timestamp_millis() as f64)
    }

    /// Rounded to the millisecond so `invert(map(t)) == t`.
    pub fn invert(&self, x: f64) -> DateTime<Utc> {
        let ms = self.linear.invert(x).round() as i64;
        from_millis(ms, self.start)
    }

    pub fn domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start, self.end)
    }

    pub fn ticks(&self) -> Vec<DateTime<Utc>> {
        let (start, end) = self.domain();
        let mut ticks = Vec::new();
        let mut t = self.interval.ceil(start);
        while t <= end {
            ticks.push(t);
            let next = self.interval.offset(t);
            if next <= t {
                break;
            }
            t = next;
        }
        ticks
    }

    pub fn axis(&self) -> Vec<AxisTick> {
        let format = self.interval.label_format();
        self.ticks()
            .into_iter()
            .map(|t| AxisTick {
                position: self.map(&t),
                label: t.format(format).to_string(),
            })
            .collect()
    }
}

/// Hour of day on the y axis, bottom to top. Hours earlier than the day
/// start are pushed past 24 so a late night stays contiguous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourScale {
    day_start: f64,
    linear: Linear,
}

impl HourScale {
    pub fn new(day_start: f64, area: &PlotArea) -> Self {
        let day_start = day_start.rem_euclid(24.0);
        Self {
            day_start,
            linear: Linear::new((day_start, day_start + 24.0), (area.bottom, area.top)),
        }
    }

    pub fn wrap(&self, hour: f64) -> f64 {
        if hour < self.day_start { hour + 24.0 } else { hour }
    }

    pub fn map(&self, hour: f64) -> f64 {
        self.linear.map(self.wrap(hour))
    }

    /// Wrapped hour at screen `y`.
    pub fn invert(&self, y: f64) -> f64 {
        self.linear.invert(y)
    }

    pub fn axis(&self) -> Vec<AxisTick> {
        let first = (self.day_start / 2.0).ceil() * 2.0;
        let mut ticks = Vec::new();
        let mut hour = first;
        while hour <= self.day_start + 24.0 {
            ticks.push(AxisTick {
                position: self.linear.map(hour),
                label: format!("{:02}:00", (hour as i64).rem_euclid(24)),
            });
            hour += 2.0;
        }
        ticks
    }
}

/// Square-root scale from line counts to mark radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    linear: Linear,
}

impl RadiusScale {
    pub fn new(min_lines: usize, max_lines: usize, range: (f64, f64)) -> Self {
        Self {
            linear: Linear::new(((min_lines as f64).sqrt(), (max_lines as f64).sqrt()), range),
        }
    }

    pub fn map(&self, lines: usize) -> f64 {
        self.linear.map((lines as f64).sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Cosine blend between a night anchor (hour 0 and 24) and a day anchor
/// (hour 12).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    night: Rgb,
    day: Rgb,
}

impl ColorScale {
    pub fn new(night: Rgb, day: Rgb) -> Self {
        Self { night, day }
    }

    pub fn map(&self, hour: f64) -> Rgb {
        let phase = hour.rem_euclid(24.0) / 24.0;
        let weight = (1.0 - (2.0 * PI * phase).cos()) / 2.0;
        Rgb::lerp(self.night, self.day, weight)
    }
}

pub fn time_extent<'a, I>(commits: I) -> Option<(DateTime<Utc>, DateTime<Utc>)>
where
    I: IntoIterator<Item = &'a Commit>,
{
    commits.into_iter().fold(None, |extent, commit| {
        let t = commit.authored_utc();
        Some(match extent {
            None => (t, t),
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
        })
    })
}

/// The four mappings for one visible set.
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    pub x: TimeScale,
    pub y: HourScale,
    pub r: RadiusScale,
    pub color: ColorScale,
}

impl Scales {
    /// Fits the scales to `visible`. An empty set centers the x domain on
    /// the cursor's day and uses a constant radius.
    pub fn fit(visible: &[&Commit], cursor: DateTime<Utc>, config: &ViewConfig) -> Self {
        let area = config.plot_area();
        let (start, end) = time_extent(visible.iter().copied()).unwrap_or((cursor, cursor));
        let (min_lines, max_lines) = visible
            .iter()
            .map(|c| c.total_lines)
            .fold(None, |acc: Option<(usize, usize)>, n| {
                Some(acc.map_or((n, n), |(lo, hi)| (lo.min(n), hi.max(n))))
            })
            .unwrap_or((0, 0));

        Self {
            x: TimeScale::new(start, end, (area.left, area.right)).nice(),
            y: HourScale::new(config.day_start_hour, &area),
            r: RadiusScale::new(min_lines, max_lines, config.radius_range),
            color: ColorScale::new(config.night_color, config.day_color),
        }
    }

    pub fn position(&self, commit: &Commit) -> Point {
        Point::new(self.x.map(&commit.authored_at), self.y.map(commit.hour_of_day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::aggregate::aggregate;
    use crate::timeline::record::fixtures::line;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn area() -> PlotArea {
        ViewConfig::default().plot_area()
    }

    #[test]
    fn test_linear_degenerate_domain_uses_midpoint() {
        let linear = Linear::new((5.0, 5.0), (2.0, 30.0));
        assert_eq!(linear.map(5.0), 16.0);
        assert_eq!(linear.map(100.0), 16.0);
        assert_eq!(linear.invert(7.0), 5.0);
    }

    #[test]
    fn test_choose_interval() {
        let start = utc("2024-05-03T12:00:00Z");
        assert_eq!(
            TickInterval::choose(start, start + Duration::hours(1), 10),
            TickInterval::Minutes(5)
        );
        assert_eq!(
            TickInterval::choose(start, start + Duration::days(25), 10),
            TickInterval::Days(2)
        );
        assert_eq!(
            TickInterval::choose(start, start + Duration::days(365 * 30), 10),
            TickInterval::Years(2)
        );
        assert_eq!(
            TickInterval::choose(start, start + Duration::days(365 * 60), 10),
            TickInterval::Years(5)
        );
    }

    #[test]
    fn test_nice_domain_covers_extent_on_boundaries() {
        let lo = utc("2024-05-03T12:10:45Z");
        let hi = utc("2024-05-28T08:00:00Z");
        let scale = TimeScale::new(lo, hi, (40.0, 990.0)).nice();
        let (start, end) = scale.domain();

        assert!(start <= lo && end >= hi);
        assert_eq!(start, utc("2024-05-03T00:00:00Z"));
        assert_eq!(end, utc("2024-05-29T00:00:00Z"));
        assert_eq!(scale.map(&start), 40.0);
        assert_eq!(scale.map(&end), 990.0);
    }

    #[test]
    fn test_single_instant_gets_non_degenerate_domain() {
        let t = utc("2024-05-03T12:10:45Z");
        let scale = TimeScale::new(t, t, (40.0, 990.0)).nice();
        let (start, end) = scale.domain();

        assert!(start < end);
        assert!(start <= t && t <= end);
        let x = scale.map(&t);
        assert!(x.is_finite() && (40.0..=990.0).contains(&x));
    }

    #[test]
    fn test_invert_round_trips_exactly() {
        let scale = TimeScale::new(
            utc("2023-01-01T00:00:00Z"),
            utc("2024-12-31T23:59:59Z"),
            (0.0, 100.0),
        );
        for raw in ["2023-03-14T15:09:26Z", "2024-07-01T00:00:01Z", "2023-01-01T00:00:00Z"] {
            let t = utc(raw);
            assert_eq!(scale.invert(scale.map(&t)), t);
        }
    }

    #[test]
    fn test_ticks_are_ascending_and_inside_domain() {
        let scale = TimeScale::new(
            utc("2024-01-15T10:00:00Z"),
            utc("2024-09-02T18:00:00Z"),
            (40.0, 990.0),
        )
        .nice();
        let ticks = scale.ticks();
        let (start, end) = scale.domain();

        assert!(ticks.len() >= 2);
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
        assert!(ticks.iter().all(|t| *t >= start && *t <= end));
        assert!(scale.axis().iter().all(|tick| !tick.label.is_empty()));
    }

    #[test]
    fn test_hour_wrap_keeps_night_contiguous() {
        let scale = HourScale::new(6.0, &area());
        assert_eq!(scale.wrap(23.5), 23.5);
        assert_eq!(scale.wrap(0.25), 24.25);
        assert_eq!(scale.wrap(6.0), 6.0);

        // Later in the night sits higher on screen.
        assert!(scale.map(0.25) < scale.map(23.5));
        assert_eq!(scale.map(6.0), area().bottom);
        assert!((scale.invert(scale.map(0.25)) - 24.25).abs() < 1e-9);
    }

    #[test]
    fn test_hour_axis_labels_wrap_modulo_24() {
        let scale = HourScale::new(6.0, &area());
        let labels: Vec<String> = scale.axis().into_iter().map(|t| t.label).collect();
        assert_eq!(labels.first().map(String::as_str), Some("06:00"));
        assert!(labels.contains(&"00:00".to_string()));
        assert_eq!(labels.last().map(String::as_str), Some("06:00"));
        assert_eq!(labels.len(), 13);
    }

    #[test]
    fn test_radius_scale() {
        let scale = RadiusScale::new(1, 100, (2.0, 30.0));
        assert_eq!(scale.map(1), 2.0);
        assert_eq!(scale.map(100), 30.0);

        let flat = RadiusScale::new(7, 7, (2.0, 30.0));
        assert_eq!(flat.map(7), 16.0);
        assert!(!flat.map(7).is_nan());
    }

    #[test]
    fn test_color_is_continuous_at_midnight() {
        let night = Rgb::parse("#1d3557").unwrap();
        let day = Rgb::parse("f4a259").unwrap();
        let scale = ColorScale::new(night, day);

        assert_eq!(scale.map(0.0), scale.map(24.0));
        assert_eq!(scale.map(0.0), night);
        assert_eq!(scale.map(12.0), day);
        assert_eq!(night.to_hex(), "#1d3557");
        assert!(Rgb::parse("#12345").is_none());
    }

    #[test]
    fn test_fit_to_visible_commits() {
        let commits = aggregate(vec![
            line("a", "x.rs", "rs", "2024-05-03T10:00:00+00:00"),
            line("b", "x.rs", "rs", "2024-05-10T14:00:00+00:00"),
            line("b", "y.rs", "rs", "2024-05-10T14:00:00+00:00"),
        ]);
        let visible: Vec<&Commit> = commits.iter().collect();
        let config = ViewConfig::default();
        let scales = Scales::fit(&visible, commits[1].authored_utc(), &config);

        assert_eq!(scales.r.map(1), 2.0);
        assert_eq!(scales.r.map(2), 30.0);
        let p = scales.position(&commits[0]);
        assert!(p.x >= config.plot_area().left && p.x <= config.plot_area().right);

        let empty = Scales::fit(&[], commits[0].authored_utc(), &config);
        assert_eq!(empty.r.map(10), 16.0);
        let (start, end) = empty.x.domain();
        assert!(start < end);
    }
}
