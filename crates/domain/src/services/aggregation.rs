//! In-memory filter / group / reduce steps over domain records.
//!
//! These mirror the SQL used by the Postgres store: same predicates, same
//! reductions, same ordering and tie-breaks.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use uuid::Uuid;

use crate::models::{
    CategoryBucket, DailySalesBucket, Order, OrderAggregate, Product, ProductRankEntry,
    RoleCount, SignupPoint, StatusBucket, TimeSeriesPoint, User,
};
use crate::services::store::{OrderFilter, TimeWindow};

/// Orders passing `filter`, in creation order. Orders created at the same
/// instant are ordered by id.
pub fn matching_orders<'a>(orders: &'a [Order], filter: &OrderFilter) -> Vec<&'a Order> {
    let mut matched: Vec<&Order> = orders
        .iter()
        .filter(|o| filter.window.contains(o.created_at))
        .filter(|o| !(filter.exclude_cancelled && o.status.is_cancelled()))
        .collect();
    matched.sort_by_key(|o| (o.created_at, o.id));
    matched
}

pub fn count_users(users: &[User], window: TimeWindow) -> u64 {
    users.iter().filter(|u| window.contains(u.created_at)).count() as u64
}

pub fn count_products(products: &[Product], window: TimeWindow) -> u64 {
    products
        .iter()
        .filter(|p| window.contains(p.created_at))
        .count() as u64
}

pub fn order_aggregate(orders: &[Order], filter: &OrderFilter) -> OrderAggregate {
    let matched = matching_orders(orders, filter);
    let revenue = matched.iter().map(|o| o.total_amount).sum();
    OrderAggregate::from_totals(matched.len() as u64, revenue)
}

pub fn daily_sales(orders: &[Order], filter: &OrderFilter) -> Vec<TimeSeriesPoint> {
    let mut days: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
    for order in matching_orders(orders, filter) {
        let entry = days.entry(order.created_at.date_naive()).or_default();
        entry.0 += order.total_amount;
        entry.1 += 1;
    }
    days.into_iter()
        .map(|(date, (sales, orders))| TimeSeriesPoint {
            date,
            sales,
            orders,
        })
        .collect()
}

pub fn daily_sales_buckets(orders: &[Order], filter: &OrderFilter) -> Vec<DailySalesBucket> {
    let mut days: BTreeMap<NaiveDate, DailySalesBucket> = BTreeMap::new();
    for order in matching_orders(orders, filter) {
        let date = order.created_at.date_naive();
        let bucket = days.entry(date).or_insert_with(|| DailySalesBucket {
            date,
            orders: 0,
            revenue: Decimal::ZERO,
            items_sold: 0,
        });
        bucket.orders += 1;
        bucket.revenue += order.total_amount;
        bucket.items_sold += order.line_count();
    }
    days.into_values().collect()
}

/// Ranks products by units sold. Ties keep first-seen order.
pub fn top_products(orders: &[Order], filter: &OrderFilter, limit: usize) -> Vec<ProductRankEntry> {
    let mut ranking: Vec<ProductRankEntry> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for order in matching_orders(orders, filter) {
        for item in &order.items {
            let slot = *index.entry(item.product_id).or_insert_with(|| {
                ranking.push(ProductRankEntry {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    total_sold: 0,
                    total_revenue: Decimal::ZERO,
                });
                ranking.len() - 1
            });
            let entry = &mut ranking[slot];
            entry.total_sold += u64::from(item.quantity);
            entry.total_revenue += item.line_total();
        }
    }

    // sort_by is stable
    ranking.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    ranking.truncate(limit);
    ranking
}

pub fn daily_signups(users: &[User], window: TimeWindow) -> Vec<SignupPoint> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for user in users.iter().filter(|u| window.contains(u.created_at)) {
        *days.entry(user.created_at.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| SignupPoint { date, count })
        .collect()
}

pub fn users_by_role(users: &[User]) -> Vec<RoleCount> {
    group_by_first_seen(users, |u| u.created_at, |u| u.role, |r| r.as_str())
        .into_iter()
        .map(|(role, members)| RoleCount {
            role: role.as_str().to_string(),
            count: members.len() as u64,
        })
        .collect()
}

pub fn products_by_category(products: &[Product]) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> =
        group_by_first_seen(products, |p| p.created_at, |p| p.category, |c| c.as_str())
        .into_iter()
        .map(|(category, members)| {
            let (count, avg_price, total_stock) = price_and_stock(&members);
            CategoryBucket {
                category: category.as_str().to_string(),
                count,
                avg_price,
                total_stock,
            }
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

pub fn products_by_status(products: &[Product]) -> Vec<StatusBucket> {
    group_by_first_seen(products, |p| p.created_at, |p| p.status, |st| st.as_str())
        .into_iter()
        .map(|(status, members)| {
            let (count, avg_price, total_stock) = price_and_stock(&members);
            StatusBucket {
                status: status.as_str().to_string(),
                count,
                avg_price,
                total_stock,
            }
        })
        .collect()
}

fn price_and_stock(products: &[&Product]) -> (u64, Decimal, i64) {
    let count = products.len() as u64;
    let price_sum: Decimal = products.iter().map(|p| p.price).sum();
    let avg_price = if count == 0 {
        Decimal::ZERO
    } else {
        price_sum / Decimal::from(count)
    };
    let total_stock = products.iter().map(|p| p.stock).sum();
    (count, avg_price, total_stock)
}

/// Groups items by key, keeping groups in first-seen order.
/// Groups ordered by their earliest `created_at`; groups first seen at the
/// same instant are ordered by label.
fn group_by_first_seen<'a, T, K>(
    items: &'a [T],
    created_at: impl Fn(&T) -> DateTime<Utc>,
    key: impl Fn(&T) -> K,
    label: impl Fn(K) -> &'static str,
) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Copy,
{
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| created_at(*item));
    let mut groups = group_in_order(sorted.into_iter(), key);
    groups.sort_by(|(a_key, a), (b_key, b)| {
        created_at(a[0])
            .cmp(&created_at(b[0]))
            .then_with(|| label(*a_key).cmp(label(*b_key)))
    });
    groups
}

fn group_in_order<'a, T, K, F>(items: impl Iterator<Item = &'a T>, key: F) -> Vec<(K, Vec<&'a T>)>
where
    T: 'a,
    K: Eq + Hash + Copy,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(k, groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}
