use crate::experiments::FiscalMultipliers;
use std::fmt::Write;

const EXPERIMENTS: [(&str, &str); 3] = [("Stimulus check", "transfers"), ("UI extension", "UI_extend"), ("Tax cut", "tax_cut")];
const REGIMES: [(&str, &str); 3] = [("Taylor", ""), ("Fixed nominal", "_fixed_nominal"), ("Fixed real", "_fixed_real")];

/// Renders consumption multipliers at the given horizons (1-based quarters),
/// one row per experiment and regime, plus the full-horizon output multiplier.
pub fn format_summary(results: &FiscalMultipliers, horizons: &[usize]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "FISCAL MULTIPLIERS (R = {:.4})", results.big_r);
    let _ = write!(out, "{:<16}{:<15}", "Experiment", "Regime");
    for h in horizons {
        let _ = write!(out, "{:>9}", format!("Q{}", h));
    }
    let _ = writeln!(out, "{:>10}", "Y (NPV)");
    let _ = writeln!(out, "{}", "-".repeat(31 + 9 * horizons.len() + 10));

    for (label, key) in EXPERIMENTS {
        for (regime, suffix) in REGIMES {
            let name = format!("{}{}", key, suffix);
            let Some(series) = results.series(&name) else { continue };
            let _ = write!(out, "{:<16}{:<15}", label, regime);
            for &h in horizons {
                match h.checked_sub(1).and_then(|i| series.get(i)) {
                    Some(m) => {
                        let _ = write!(out, "{:>9.3}", m);
                    }
                    None => {
                        let _ = write!(out, "{:>9}", "-");
                    }
                }
            }
            match results.output_multipliers.get(&name) {
                Some(y) => {
                    let _ = writeln!(out, "{:>10.3}", y);
                }
                None => {
                    let _ = writeln!(out, "{:>10}", "-");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_rows_and_missing_horizons() {
        let mut multipliers = BTreeMap::new();
        multipliers.insert("transfers".to_string(), vec![0.5, 0.6]);
        multipliers.insert("tax_cut_fixed_real".to_string(), vec![0.1]);
        let results = FiscalMultipliers {
            big_r: 1.01,
            multipliers,
            irfs: BTreeMap::new(),
            output_multipliers: BTreeMap::from([("transfers".to_string(), 0.75)]),
            supplementary: BTreeMap::new(),
        };

        let text = format_summary(&results, &[1, 4]);
        let rows: Vec<&str> = text.lines().skip(3).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("Stimulus check  Taylor"));
        assert!(rows[0].contains("0.500"));
        assert!(rows[0].trim_end().ends_with("0.750"));
        assert!(rows[1].starts_with("Tax cut"));
        assert!(rows[1].contains("-"));
    }
}
