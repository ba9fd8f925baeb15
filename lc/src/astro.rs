//! Astronomical primitives: Julian days, ΔT, solar longitude and new moons
//!
//! Solar positions use a truncated VSOP87 Earth series with nutation and
//! aberration corrections; new moons use the Meeus mean-phase series with
//! periodic terms. Both are accurate to about a minute across 1900-2100,
//! which is the resolution calendar boundaries care about.
//!
//! Civil times throughout the crate are China Standard Time (UTC+8).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Julian day of the J2000.0 epoch
pub const J2000: f64 = 2_451_545.0;

/// Mean length of the tropical year in days
pub const TROPICAL_YEAR: f64 = 365.242_2;

/// Mean length of the synodic month in days
pub const SYNODIC_MONTH: f64 = 29.530_588_861;

/// Offset of China Standard Time from UT, in days
const CHINA_OFFSET: f64 = 8.0 / 24.0;

/// Julian day number offset from chrono's day count (0001-01-01 = day 1)
const JDN_CE_OFFSET: i64 = 1_721_425;

const DEG: f64 = std::f64::consts::PI / 180.0;

/// Julian Day Number of a calendar date (the JD at noon)
pub fn jdn(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 + JDN_CE_OFFSET
}

/// Calendar date of a Julian Day Number
pub fn date_from_jdn(jdn: i64) -> Option<NaiveDate> {
    i32::try_from(jdn - JDN_CE_OFFSET)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Julian day of a wall-clock moment (no zone conversion)
pub fn julian_day(moment: NaiveDateTime) -> f64 {
    jdn(moment.date()) as f64 - 0.5 + moment.num_seconds_from_midnight() as f64 / 86_400.0
}

/// Wall-clock moment of a Julian day, rounded to the second
pub fn moment_from_julian_day(jd: f64) -> Option<NaiveDateTime> {
    let shifted = jd + 0.5;
    let day = shifted.floor();
    let seconds = ((shifted - day) * 86_400.0).round() as i64;
    let midnight = date_from_jdn(day as i64)?.and_hms_opt(0, 0, 0)?;
    midnight.checked_add_signed(Duration::seconds(seconds))
}

fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000) / 365.25
}

/// ΔT = TT - UT in seconds (Espenak-Meeus polynomials, 1860-2150)
pub fn delta_t(year: f64) -> f64 {
    let y = year;
    if y < 1900.0 {
        let t = y - 1860.0;
        7.62 + 0.5737 * t - 0.251_754 * t.powi(2) + 0.016_806_68 * t.powi(3) - 0.000_447_362_4 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494_119 * t - 0.059_893_9 * t.powi(2) + 0.006_196_6 * t.powi(3) - 0.000_197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.844_93 * t - 0.076_100 * t.powi(2) + 0.002_093_6 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
            + 0.001_727_5 * t.powi(3)
            + 0.000_651_814 * t.powi(4)
            + 0.000_023_735_99 * t.powi(5)
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + 0.322_17 * t + 0.005_589 * t.powi(2)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    }
}

/// Convert a China Standard Time Julian day to Terrestrial Time
pub fn china_to_tt(jd_local: f64) -> f64 {
    let ut = jd_local - CHINA_OFFSET;
    ut + delta_t(decimal_year(ut)) / 86_400.0
}

/// Convert a Terrestrial Time Julian day to China Standard Time
pub fn tt_to_china(jde: f64) -> f64 {
    jde - delta_t(decimal_year(jde)) / 86_400.0 + CHINA_OFFSET
}

/// Beijing calendar day (as a JDN) on which a TT instant falls
pub fn china_day(jde: f64) -> i64 {
    (tt_to_china(jde) + 0.5).floor() as i64
}

// VSOP87 Earth heliocentric longitude and radius, truncated (A, B, C):
// term = A * cos(B + C * tau), tau in Julian millennia from J2000.
const L0: [(f64, f64, f64); 39] = [
    (175_347_046.0, 0.0, 0.0),
    (3_341_656.0, 4.669_256_8, 6_283.075_850_0),
    (34_894.0, 4.626_1, 12_566.151_7),
    (3_497.0, 2.744_1, 5_753.384_9),
    (3_418.0, 2.828_9, 3.523_1),
    (3_136.0, 3.627_7, 77_713.771_5),
    (2_676.0, 4.418_1, 7_860.419_4),
    (2_343.0, 6.135_2, 3_930.209_7),
    (1_324.0, 0.742_5, 11_506.769_8),
    (1_273.0, 2.037_1, 529.691_0),
    (1_199.0, 1.109_6, 1_577.343_5),
    (990.0, 5.233, 5_884.927),
    (902.0, 2.045, 26.298),
    (857.0, 3.508, 398.149),
    (780.0, 1.179, 5_223.694),
    (753.0, 2.533, 5_507.553),
    (505.0, 4.583, 18_849.228),
    (492.0, 4.205, 775.523),
    (357.0, 2.920, 0.067),
    (317.0, 5.849, 11_790.629),
    (284.0, 1.899, 796.298),
    (271.0, 0.315, 10_977.079),
    (243.0, 0.345, 5_486.778),
    (206.0, 4.806, 2_544.314),
    (205.0, 1.869, 5_573.143),
    (202.0, 2.458, 6_069.777),
    (156.0, 0.833, 213.299),
    (132.0, 3.411, 2_942.463),
    (126.0, 1.083, 20.775),
    (115.0, 0.645, 0.980),
    (103.0, 0.636, 4_694.003),
    (102.0, 0.976, 15_720.839),
    (102.0, 4.267, 7.114),
    (99.0, 6.21, 2_146.17),
    (98.0, 0.68, 155.42),
    (86.0, 5.98, 161_000.69),
    (85.0, 1.30, 6_275.96),
    (85.0, 3.67, 71_430.70),
    (80.0, 1.81, 17_260.15),
];

const L1: [(f64, f64, f64); 20] = [
    (628_331_966_747.0, 0.0, 0.0),
    (206_059.0, 2.678_235, 6_283.075_850),
    (4_303.0, 2.635_1, 12_566.151_7),
    (425.0, 1.590, 3.523),
    (119.0, 5.796, 26.298),
    (109.0, 2.966, 1_577.344),
    (93.0, 2.59, 18_849.23),
    (72.0, 1.14, 529.69),
    (68.0, 1.87, 398.15),
    (67.0, 4.41, 5_507.55),
    (59.0, 2.89, 5_223.69),
    (56.0, 2.17, 155.42),
    (45.0, 0.40, 796.30),
    (36.0, 0.47, 775.52),
    (29.0, 2.65, 7.11),
    (21.0, 5.34, 0.98),
    (19.0, 1.85, 5_486.78),
    (19.0, 4.97, 213.30),
    (17.0, 2.99, 6_275.96),
    (16.0, 0.03, 2_544.31),
];

const L2: [(f64, f64, f64); 7] = [
    (52_919.0, 0.0, 0.0),
    (8_720.0, 1.072_1, 6_283.075_8),
    (309.0, 0.867, 12_566.152),
    (27.0, 0.05, 3.52),
    (16.0, 5.19, 26.30),
    (16.0, 3.68, 155.42),
    (10.0, 0.76, 18_849.23),
];

const L3: [(f64, f64, f64); 3] = [(289.0, 5.844, 6_283.076), (35.0, 0.0, 0.0), (17.0, 5.49, 12_566.15)];

const L4: [(f64, f64, f64); 1] = [(114.0, 3.142, 0.0)];

const R0: [(f64, f64, f64); 6] = [
    (100_013_989.0, 0.0, 0.0),
    (1_670_700.0, 3.098_463_5, 6_283.075_850_0),
    (13_956.0, 3.055_25, 12_566.151_70),
    (3_084.0, 5.198_5, 77_713.771_5),
    (1_628.0, 1.173_9, 5_753.384_9),
    (1_576.0, 2.846_9, 7_860.419_4),
];

fn series(terms: &[(f64, f64, f64)], tau: f64) -> f64 {
    terms.iter().map(|(a, b, c)| a * (b + c * tau).cos()).sum()
}

/// Normalize an angle in degrees to [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Apparent geocentric ecliptic longitude of the Sun, in degrees, at a TT Julian day
pub fn apparent_solar_longitude(jde: f64) -> f64 {
    let tau = (jde - J2000) / 365_250.0;
    let l = (series(&L0, tau)
        + series(&L1, tau) * tau
        + series(&L2, tau) * tau.powi(2)
        + series(&L3, tau) * tau.powi(3)
        + series(&L4, tau) * tau.powi(4))
        / 1e8;
    let radius = series(&R0, tau) / 1e8;

    // Geometric longitude of the Sun is the Earth's heliocentric longitude + 180
    let geometric = l / DEG + 180.0;

    let t = tau * 10.0;
    let omega = (125.044_52 - 1_934.136_261 * t) * DEG;
    let sun_mean = (280.466_5 + 36_000.769_8 * t) * DEG;
    let moon_mean = (218.316_5 + 481_267.881_3 * t) * DEG;
    let nutation = (-17.20 * omega.sin() - 1.32 * (2.0 * sun_mean).sin() - 0.23 * (2.0 * moon_mean).sin()
        + 0.21 * (2.0 * omega).sin())
        / 3600.0;
    let fk5 = -0.090_33 / 3600.0;
    let aberration = -20.489_8 / 3600.0 / radius;

    normalize_degrees(geometric + fk5 + nutation + aberration)
}

/// TT Julian day at which the apparent solar longitude reaches `target` degrees,
/// searched from the estimate `guess` (which must lie within a few days)
pub fn solar_longitude_crossing(target: f64, guess: f64) -> f64 {
    let mut jde = guess;
    for _ in 0..50 {
        let diff = normalize_degrees(target - apparent_solar_longitude(jde) + 180.0) - 180.0;
        jde += diff * TROPICAL_YEAR / 360.0;
        if diff.abs() < 1e-9 {
            break;
        }
    }
    jde
}

/// Lunation number whose mean new moon is nearest a TT Julian day (0 = January 2000)
pub fn lunation_near(jde: f64) -> i64 {
    ((jde - 2_451_550.097_66) / SYNODIC_MONTH).round() as i64
}

/// TT Julian day of the true new moon for lunation `k`
pub fn new_moon(k: i64) -> f64 {
    let k = k as f64;
    let t = k / 1_236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let mean = 2_451_550.097_66 + SYNODIC_MONTH * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = (2.553_4 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3) * DEG;
    let mp = (201.564_3 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3 - 0.000_000_058 * t4) * DEG;
    let f = (160.710_8 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3 + 0.000_000_011 * t4) * DEG;
    let omega = (124.774_6 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3) * DEG;

    let periodic = -0.407_20 * mp.sin() + 0.172_41 * e * m.sin() + 0.016_08 * (2.0 * mp).sin()
        + 0.010_39 * (2.0 * f).sin()
        + 0.007_39 * e * (mp - m).sin()
        - 0.005_14 * e * (mp + m).sin()
        + 0.002_08 * e * e * (2.0 * m).sin()
        - 0.001_11 * (mp - 2.0 * f).sin()
        - 0.000_57 * (mp + 2.0 * f).sin()
        + 0.000_56 * e * (2.0 * mp + m).sin()
        - 0.000_42 * (3.0 * mp).sin()
        + 0.000_42 * e * (m + 2.0 * f).sin()
        + 0.000_38 * e * (m - 2.0 * f).sin()
        - 0.000_24 * e * (2.0 * mp - m).sin()
        - 0.000_17 * omega.sin()
        - 0.000_07 * (mp + 2.0 * m).sin()
        + 0.000_04 * (2.0 * mp - 2.0 * f).sin()
        + 0.000_04 * (3.0 * m).sin()
        + 0.000_03 * (mp + m - 2.0 * f).sin()
        + 0.000_03 * (2.0 * mp + 2.0 * f).sin()
        - 0.000_03 * (mp + m + 2.0 * f).sin()
        + 0.000_03 * (mp - m + 2.0 * f).sin()
        - 0.000_02 * (mp - m - 2.0 * f).sin()
        - 0.000_02 * (3.0 * mp + m).sin()
        + 0.000_02 * (4.0 * mp).sin();

    // Planetary arguments (A1..A14): base, rate per lunation, coefficient
    const PLANETARY: [(f64, f64, f64); 14] = [
        (299.77, 0.107_408, 0.000_325),
        (251.88, 0.016_321, 0.000_165),
        (251.83, 26.651_886, 0.000_164),
        (349.42, 36.412_478, 0.000_126),
        (84.66, 18.206_239, 0.000_110),
        (141.74, 53.303_771, 0.000_062),
        (207.14, 2.453_732, 0.000_060),
        (154.84, 7.306_860, 0.000_056),
        (34.52, 27.261_239, 0.000_047),
        (207.19, 0.121_824, 0.000_042),
        (291.34, 1.844_379, 0.000_040),
        (161.72, 24.198_154, 0.000_037),
        (239.56, 25.513_099, 0.000_035),
        (331.55, 3.592_518, 0.000_023),
    ];
    let planetary: f64 = PLANETARY
        .iter()
        .enumerate()
        .map(|(i, (base, rate, coeff))| {
            // A1 carries a secular T^2 term
            let secular = if i == 0 { -0.009_173 * t2 } else { 0.0 };
            coeff * ((base + rate * k + secular) * DEG).sin()
        })
        .sum();

    mean + periodic + planetary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn china_moment(jde: f64) -> NaiveDateTime {
        moment_from_julian_day(tt_to_china(jde)).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn minutes_apart(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
        (a - b).num_minutes().abs()
    }

    #[test]
    fn test_jdn_round_trip() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(jdn(date), 2_451_545);
        assert_eq!(date_from_jdn(2_451_545), Some(date));
        assert_eq!(jdn(NaiveDate::from_ymd_opt(1949, 10, 1).unwrap()), 2_433_191);
    }

    #[test]
    fn test_julian_day_of_moment() {
        assert_eq!(julian_day(at(2000, 1, 1, 12, 0)), J2000);
        let back = moment_from_julian_day(julian_day(at(1990, 5, 15, 8, 30))).unwrap();
        assert_eq!(back, at(1990, 5, 15, 8, 30));
    }

    #[test]
    fn test_delta_t_plausible() {
        assert!((delta_t(2000.0) - 63.86).abs() < 0.01);
        assert!(delta_t(1900.0).abs() < 5.0);
        assert!(delta_t(2024.0) > 60.0 && delta_t(2024.0) < 80.0);
    }

    #[test]
    fn test_solar_longitude_at_equinox() {
        // March equinox 2024: 2024-03-20 11:06 China time
        let jde = china_to_tt(julian_day(at(2024, 3, 20, 11, 6)));
        let lon = apparent_solar_longitude(jde);
        let off = normalize_degrees(lon + 180.0) - 180.0;
        assert!(off.abs() < 0.002, "longitude {} too far from 0", lon);
    }

    #[test]
    fn test_longitude_crossing_lichun_2024() {
        let guess = china_to_tt(julian_day(at(2024, 2, 4, 0, 0)));
        let jde = solar_longitude_crossing(315.0, guess);
        assert!(minutes_apart(china_moment(jde), at(2024, 2, 4, 16, 27)) <= 2);
    }

    #[test]
    fn test_new_moons_2024() {
        let k = lunation_near(china_to_tt(julian_day(at(2024, 1, 11, 0, 0))));
        assert!(minutes_apart(china_moment(new_moon(k)), at(2024, 1, 11, 19, 57)) <= 2);
        assert!(minutes_apart(china_moment(new_moon(k + 1)), at(2024, 2, 10, 6, 59)) <= 2);
    }

    #[test]
    fn test_china_day() {
        let jde = china_to_tt(julian_day(at(2024, 2, 10, 6, 59)));
        assert_eq!(china_day(jde), jdn(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()));
    }
}
