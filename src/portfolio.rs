use std::collections::HashMap;

use piechart::{Chart, Color};

use crate::holding::Holding;
use crate::position::{aggregate, Position};
use crate::spot::SpotQuote;

/// One valued position: the aggregated holding priced against the
/// current spot quote. All figures are exact floats; rounding to cents
/// happens only when a row is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRow {
    pub metal: String,
    pub design: String,
    pub ounces: f64,
    pub avg_buy_price: f64,
    pub spot: f64,
    pub market_value: f64,
    pub cost: f64,
    pub gain_loss: f64,
}

pub struct Portfolio {
    pub positions: Vec<Position>,
}

impl Portfolio {
    pub fn from_holdings(holdings: &[Holding]) -> Portfolio {
        Portfolio {
            positions: aggregate(holdings),
        }
    }

    /// Price every position against the quote. Metals the quote does not
    /// carry are valued at zero rather than failing. With a filter, rows
    /// of other metals are dropped and excluded from the total, matching
    /// the single-metal view.
    pub fn valuate(&self, quote: &SpotQuote, filter: Option<&str>) -> (Vec<ValuationRow>, f64) {
        let mut rows = Vec::new();
        let mut total_value = 0.0;

        for position in &self.positions {
            if let Some(metal) = filter {
                if position.metal != metal {
                    continue;
                }
            }

            let spot = quote.price_of(&position.metal);
            let market_value = position.ounces * spot;
            let cost = position.ounces * position.avg_buy_price;

            total_value += market_value;
            rows.push(ValuationRow {
                metal: position.metal.clone(),
                design: position.design.clone(),
                ounces: position.ounces,
                avg_buy_price: position.avg_buy_price,
                spot,
                market_value,
                cost,
                gain_loss: market_value - cost,
            });
        }

        (rows, total_value)
    }

    /// Share of current market value per metal, in percent.
    pub fn get_allocation(&self, quote: &SpotQuote) -> HashMap<String, f64> {
        let mut allocation: HashMap<String, f64> = HashMap::new();
        let (rows, total_value) = self.valuate(quote, None);
        if total_value <= 0.0 {
            return allocation;
        }

        for row in rows {
            let percentage = row.market_value / total_value * 100.0;
            *allocation.entry(row.metal).or_insert(0.0) += percentage;
        }
        allocation
    }

    // Print the valued wallet as a table
    pub fn print(&self, quote: &SpotQuote, filter: Option<&str>) {
        use comfy_table::{
            presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor,
            ContentArrangement, Table,
        };

        let (rows, total_value) = self.valuate(quote, filter);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(100);

        table.set_header(vec![
            Cell::new("Metal").add_attribute(Attribute::Bold),
            Cell::new("Design").add_attribute(Attribute::Bold),
            Cell::new("Ounces").add_attribute(Attribute::Bold),
            Cell::new("Avg Cost").add_attribute(Attribute::Bold),
            Cell::new("Spot").add_attribute(Attribute::Bold),
            Cell::new("Gain/Loss").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        for row in &rows {
            let design = if row.design.is_empty() {
                "-".to_string()
            } else {
                row.design.clone()
            };

            let gain_color = if row.gain_loss >= 0.0 {
                TColor::Green
            } else {
                TColor::Red
            };

            table.add_row(vec![
                Cell::new(&row.metal),
                Cell::new(design),
                Cell::new(format_ounces(row.ounces)).set_alignment(CellAlignment::Right),
                Cell::new(format!("${:.2}", row.avg_buy_price)).set_alignment(CellAlignment::Right),
                Cell::new(format!("${:.2}", row.spot)).set_alignment(CellAlignment::Right),
                Cell::new(format!("${:.2}", row.gain_loss))
                    .set_alignment(CellAlignment::Right)
                    .fg(gain_color),
                Cell::new(format!("${:.2}", row.market_value))
                    .set_alignment(CellAlignment::Right)
                    .fg(TColor::Green),
            ]);
        }

        let total_gain: f64 = rows.iter().map(|r| r.gain_loss).sum();
        let total_gain_color = if total_gain >= 0.0 {
            TColor::Green
        } else {
            TColor::Red
        };
        table.add_row(vec![
            Cell::new("TOTAL").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(format!("${total_gain:.2}"))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold)
                .fg(total_gain_color),
            Cell::new(format!("${total_value:.2}"))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold)
                .fg(TColor::Green),
        ]);

        println!("{table}");
    }

    // Print the allocation in descending order %-wise
    pub fn print_allocation(&self, quote: &SpotQuote) {
        let allocation = self.get_allocation(quote);

        let mut allocation_vec: Vec<(&String, &f64)> = allocation.iter().collect();
        allocation_vec.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());

        println!("====================================");
        for (metal, percentage) in allocation_vec {
            println!("{metal: >12} | {percentage: >10.2}");
        }
    }

    pub fn draw_pie_chart(&self, quote: &SpotQuote) {
        let (rows, total_value) = self.valuate(quote, None);
        if total_value <= 0.0 {
            return;
        }

        let colors = [
            Color::Yellow,
            Color::White,
            Color::Red,
            Color::Green,
            Color::Blue,
            Color::Cyan,
            Color::Purple,
            Color::Black,
        ];

        let mut data = vec![];
        for (i, row) in rows.iter().enumerate() {
            let label = if row.design.is_empty() {
                row.metal.clone()
            } else {
                format!("{} ({})", row.metal, row.design)
            };

            data.push(piechart::Data {
                label,
                value: row.market_value as f32,
                color: Some(colors[i % colors.len()].into()),
                fill: '•',
            });
        }

        Chart::new()
            .legend(true)
            .radius(9)
            .aspect_ratio(3)
            .draw(&data);
    }
}

fn format_ounces(ounces: f64) -> String {
    if ounces.fract() == 0.0 {
        format!("{ounces:.0}")
    } else {
        format!("{ounces:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::COPPER_SPOT;

    fn quote(gold: f64, silver: f64) -> SpotQuote {
        SpotQuote {
            gold,
            silver,
            copper: COPPER_SPOT,
            last_updated: None,
        }
    }

    #[test]
    fn test_valuate_two_gold_positions() {
        let holdings = vec![
            Holding::new("gold", "", 1.0, 2, 1000.0),
            Holding::new("gold", "eagle", 1.0, 1, 1200.0),
        ];
        let portfolio = Portfolio::from_holdings(&holdings);
        let (rows, total_value) = portfolio.valuate(&quote(2000.0, 0.0), None);

        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].design, "");
        assert_eq!(rows[0].ounces, 2.0);
        assert_eq!(rows[0].avg_buy_price, 1000.0);
        assert_eq!(rows[0].market_value, 4000.0);
        assert_eq!(rows[0].gain_loss, 2000.0);

        assert_eq!(rows[1].design, "eagle");
        assert_eq!(rows[1].ounces, 1.0);
        assert_eq!(rows[1].avg_buy_price, 1200.0);
        assert_eq!(rows[1].market_value, 2000.0);
        assert_eq!(rows[1].gain_loss, 800.0);

        assert_eq!(total_value, 6000.0);
    }

    #[test]
    fn test_valuate_unknown_metal_is_worth_zero() {
        let holdings = vec![Holding::new("platinum", "", 1.0, 1, 900.0)];
        let portfolio = Portfolio::from_holdings(&holdings);
        let (rows, total_value) = portfolio.valuate(&quote(2000.0, 25.0), None);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spot, 0.0);
        assert_eq!(rows[0].market_value, 0.0);
        assert_eq!(rows[0].gain_loss, -900.0);
        assert_eq!(total_value, 0.0);
    }

    #[test]
    fn test_valuate_filter_excludes_rows_and_total() {
        let holdings = vec![
            Holding::new("gold", "", 1.0, 1, 1000.0),
            Holding::new("silver", "", 1.0, 10, 20.0),
        ];
        let portfolio = Portfolio::from_holdings(&holdings);

        let (rows, total_value) = portfolio.valuate(&quote(2000.0, 25.0), Some("silver"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metal, "silver");
        assert_eq!(total_value, 250.0);
    }

    #[test]
    fn test_gain_loss_reflects_cost_basis() {
        let holdings = vec![Holding::new("silver", "", 1.0, 10, 30.0)];
        let portfolio = Portfolio::from_holdings(&holdings);
        let (rows, _) = portfolio.valuate(&quote(0.0, 25.0), None);

        assert_eq!(rows[0].cost, 300.0);
        assert_eq!(rows[0].market_value, 250.0);
        assert_eq!(rows[0].gain_loss, -50.0);
    }

    #[test]
    fn test_allocation_sums_to_hundred() {
        let holdings = vec![
            Holding::new("gold", "", 1.0, 1, 1000.0),
            Holding::new("gold", "eagle", 1.0, 1, 1000.0),
            Holding::new("silver", "", 1.0, 40, 20.0),
        ];
        let portfolio = Portfolio::from_holdings(&holdings);
        let allocation = portfolio.get_allocation(&quote(2000.0, 25.0));

        assert_eq!(allocation.len(), 2);
        let sum: f64 = allocation.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((allocation["gold"] - 80.0).abs() < 1e-9);
        assert!((allocation["silver"] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_allocation_of_worthless_portfolio_is_empty() {
        let holdings = vec![Holding::new("gold", "", 1.0, 1, 1000.0)];
        let portfolio = Portfolio::from_holdings(&holdings);
        assert!(portfolio.get_allocation(&quote(0.0, 0.0)).is_empty());
    }
}
