//! Linear-footage allocation across merchandising categories

use crate::model::{
    display_label, round_to, AssetInstance, CategoryAllocation, MerchandisingSummary, TopN,
    MM_PER_FOOT, OTHER_MERCHANDISING,
};
use itertools::Itertools;
use std::collections::HashMap;

/// Per-category totals in first-seen order
#[derive(Debug, Default)]
struct CategoryTotals {
    order: Vec<String>,
    totals: HashMap<String, f64>,
    grand_total: f64,
}

impl CategoryTotals {
    fn add(&mut self, category: &str, share: f64) {
        match self.totals.get_mut(category) {
            Some(total) => *total += share,
            None => {
                self.order.push(category.to_string());
                self.totals.insert(category.to_string(), share);
            }
        }
        self.grand_total += share;
    }

    fn percentage_of(&self, value: f64) -> f64 {
        if self.grand_total > 0.0 {
            round_to(value / self.grand_total * 100.0, 1)
        } else {
            0.0
        }
    }
}

pub struct MerchandisingAllocator;

impl MerchandisingAllocator {
    /// Split each categorized instance's width evenly over its categories,
    /// rank the categories and fold everything past `top_n` into
    /// "Other Merchandising".
    pub fn allocate(instances: &[AssetInstance], top_n: TopN) -> MerchandisingSummary {
        let totals = Self::accumulate(instances);

        if totals.grand_total <= 0.0 {
            return MerchandisingSummary {
                snapshot_id: None,
                top_n,
                rows: Vec::new(),
                total_linear_feet: 0.0,
                total_display: format!("{:.1}", 0.0),
            };
        }

        let ranked: Vec<CategoryAllocation> = totals
            .order
            .iter()
            .map(|key| {
                let share = totals.totals[key];
                CategoryAllocation {
                    label: display_label(key),
                    key: key.clone(),
                    value: round_to(share, 2),
                    percentage: totals.percentage_of(share),
                }
            })
            .sorted_by(|a, b| b.value.total_cmp(&a.value))
            .collect();

        let rows = Self::fold_tail(ranked, top_n, &totals);

        MerchandisingSummary {
            snapshot_id: None,
            top_n,
            rows,
            total_linear_feet: round_to(totals.grand_total, 2),
            total_display: format!("{:.1}", totals.grand_total),
        }
    }

    /// Linear feet an instance contributes in total, before splitting
    pub fn linear_feet(instance: &AssetInstance) -> f64 {
        instance
            .asset()
            .map(|asset| asset.width_mm() / MM_PER_FOOT)
            .unwrap_or(0.0)
    }

    fn accumulate(instances: &[AssetInstance]) -> CategoryTotals {
        let mut totals = CategoryTotals::default();

        for instance in instances {
            let categories = instance.merch_categories();
            if categories.is_empty() {
                continue;
            }

            let share = Self::linear_feet(instance) / categories.len() as f64;
            for category in categories {
                totals.add(category, share);
            }
        }

        totals
    }

    fn fold_tail(
        mut ranked: Vec<CategoryAllocation>,
        top_n: TopN,
        totals: &CategoryTotals,
    ) -> Vec<CategoryAllocation> {
        if ranked.len() <= top_n.get() {
            return ranked;
        }

        let tail = ranked.split_off(top_n.get());
        let other_value = round_to(tail.iter().map(|row| row.value).sum(), 2);

        ranked.push(CategoryAllocation {
            label: OTHER_MERCHANDISING.to_string(),
            key: OTHER_MERCHANDISING.to_string(),
            value: other_value,
            percentage: totals.percentage_of(other_value),
        });
        ranked
    }
}
