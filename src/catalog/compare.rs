use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Id, Motor, MotorSpecification, OrDash, NAMESPACE};
use crate::{
    abort::AbortSignal,
    client::{ApiClient, ApiRequest},
    error::{ApiError, Result},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Two motors fetched side by side.
pub struct Comparison {
    pub motor1: Motor,
    pub motor2: Motor,
}

/// One specification item, with each motor's value if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub item_id: Id,
    pub name: String,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl ComparisonRow {
    pub fn differs(&self) -> bool {
        self.left != self.right
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonGroup {
    pub group_id: Id,
    pub name: String,
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    pub async fn fetch(
        client: &ApiClient,
        first: Id,
        second: Id,
        signal: Option<&AbortSignal>,
    ) -> Result<Self> {
        if first == second {
            return Err(ApiError::Validation(
                "pick two different motors to compare".into(),
            ));
        }
        let request = ApiRequest::get(format!("{NAMESPACE}/komparasi/{first}/{second}"));
        client.fetch_data(request, signal).await
    }

    /// Specification rows grouped by specification group. Groups and rows
    /// keep the order in which they first appear, left motor first.
    pub fn table(&self) -> Vec<ComparisonGroup> {
        let mut groups: Vec<ComparisonGroup> = Vec::new();

        let mut place = |spec: &MotorSpecification, left: bool| {
            let item = &spec.specification_item;
            let group_ref = &item.specification_group;
            let group = match groups.iter().position(|g| g.group_id == group_ref.id) {
                Some(index) => &mut groups[index],
                None => {
                    groups.push(ComparisonGroup {
                        group_id: group_ref.id,
                        name: group_ref.name.clone(),
                        rows: Vec::new(),
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };
            let row = match group.rows.iter().position(|r| r.item_id == item.id) {
                Some(index) => &mut group.rows[index],
                None => {
                    group.rows.push(ComparisonRow {
                        item_id: item.id,
                        name: item.name.clone(),
                        left: None,
                        right: None,
                    });
                    let last = group.rows.len() - 1;
                    &mut group.rows[last]
                }
            };
            let value = Some(spec.display_value());
            if left {
                row.left = value;
            } else {
                row.right = value;
            }
        };

        for spec in &self.motor1.specifications {
            place(spec, true);
        }
        for spec in &self.motor2.specifications {
            place(spec, false);
        }
        groups
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vs {}", self.motor1.name, self.motor2.name)?;
        writeln!(
            f,
            "  Price: {} | {}",
            self.motor1.price_range(),
            self.motor2.price_range()
        )?;
        for group in self.table() {
            writeln!(f, "[{}]", group.name)?;
            for row in &group.rows {
                let marker = if row.differs() { "*" } else { " " };
                writeln!(
                    f,
                    "{marker} {}: {} | {}",
                    row.name,
                    OrDash(&row.left),
                    OrDash(&row.right)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn motor(id: Id, specs: serde_json::Value) -> Motor {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("Motor {id}"),
            "year_model": "2024",
            "engine_cc": 150,
            "low_price": 1000,
            "up_price": 1000,
            "specifications": specs,
        }))
        .unwrap()
    }

    fn spec(item: Id, name: &str, group: Id, group_name: &str, value: &str) -> serde_json::Value {
        json!({
            "id": item * 100,
            "value": value,
            "specification_item": {
                "id": item, "name": name, "unit": null,
                "specification_group": {"id": group, "name": group_name}
            }
        })
    }

    #[test]
    fn rows_merge_both_sides() {
        let comparison = Comparison {
            motor1: motor(
                1,
                json!([
                    spec(1, "Bore", 10, "Engine", "57"),
                    spec(2, "Stroke", 10, "Engine", "55"),
                ]),
            ),
            motor2: motor(
                2,
                json!([
                    spec(2, "Stroke", 10, "Engine", "55"),
                    spec(3, "Weight", 20, "Chassis", "112"),
                ]),
            ),
        };

        let table = comparison.table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name, "Engine");
        assert_eq!(table[0].rows.len(), 2);
        assert_eq!(table[0].rows[0].right, None);
        assert!(!table[0].rows[1].differs());
        assert_eq!(table[1].rows[0].left, None);
        assert_eq!(table[1].rows[0].right.as_deref(), Some("112"));

        let rendered = comparison.to_string();
        assert!(rendered.contains("* Bore: 57 | -"));
    }
}
