use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use imbalance_prices::{PriceTable, core::lattice::STEP};

pub fn build_price_table(prices: &PriceTable) -> Table {
    let mean_charge_price = mean(prices.iter().filter_map(|point| point.charge_price));
    let mean_discharge_price = mean(prices.iter().filter_map(|point| point.discharge_price));

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Date", "Start", "End", "Charge", "Discharge"]);
    for point in prices {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%Y-%m-%d")).add_attribute(Attribute::Dim),
            Cell::new(point.timestamp.format("%H:%M %Z")),
            Cell::new((point.timestamp + STEP).format("%H:%M")).add_attribute(Attribute::Dim),
            build_price_cell(point.charge_price, mean_charge_price),
            build_price_cell(point.discharge_price, mean_discharge_price),
        ]);
    }
    table
}

fn build_price_cell(price: Option<f64>, mean: Option<f64>) -> Cell {
    match price {
        Some(price) => Cell::new(format!("{price:.2}")).set_alignment(CellAlignment::Right).fg(
            if mean.is_some_and(|mean| price >= mean) { Color::Red } else { Color::Green },
        ),
        None => Cell::new("n/a").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));
    (count != 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe;
    use imbalance_prices::PricePoint;

    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([1.0, 2.0, 6.0].into_iter()), Some(3.0));
    }

    #[test]
    fn test_build_price_table() -> imbalance_prices::prelude::Result {
        let start = Europe::Amsterdam.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let prices = PriceTable::try_new(vec![
            PricePoint::from_single(start, Some(12.5)),
            PricePoint::from_single(start + STEP, None),
        ])?;
        let rendered = build_price_table(&prices).to_string();
        assert!(rendered.contains("12.50"));
        assert!(rendered.contains("n/a"));
        assert!(rendered.contains("00:15"));
        Ok(())
    }
}
