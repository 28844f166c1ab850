//! Navigation tree assembly
//!
//! Only two levels are materialized: roots (`parent_id == 0`) and their direct
//! children. Deeper rows, and rows whose parent is not among the roots, are
//! dropped without error.

use super::{Menu, MenuNode};
use std::cmp::Ordering;

/// Build the navigation forest from a flat, already filtered menu sequence.
///
/// Roots and each child list are ordered by `sort_order`, then by `id`.
pub fn build_tree(menus: &[Menu]) -> Vec<MenuNode> {
    let mut roots: Vec<&Menu> = menus.iter().filter(|m| m.is_root()).collect();
    roots.sort_by(|a, b| menu_order(a, b));

    roots
        .into_iter()
        .map(|root| {
            let mut children: Vec<&Menu> = menus
                .iter()
                .filter(|m| !m.is_root() && m.parent_id == root.id)
                .collect();
            children.sort_by(|a, b| menu_order(a, b));

            let mut node = MenuNode::from(root);
            node.children = Some(children.into_iter().map(MenuNode::from).collect());
            node
        })
        .collect()
}

fn menu_order(a: &Menu, b: &Menu) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuType;
    use crate::models::Status;
    use pretty_assertions::assert_eq;

    fn menu(id: i64, parent_id: i64, sort_order: i32) -> Menu {
        Menu {
            id,
            name: format!("menu-{}", id),
            path: Some(format!("/m/{}", id)),
            component: None,
            icon: None,
            parent_id,
            sort_order,
            permission: None,
            menu_type: MenuType::Menu,
            status: Status::Active,
        }
    }

    fn ids(nodes: &[MenuNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_two_level_tree() {
        let menus = vec![menu(1, 0, 2), menu(2, 0, 1), menu(3, 1, 1), menu(4, 3, 1)];

        let tree = build_tree(&menus);

        assert_eq!(ids(&tree), vec![2, 1]);
        assert_eq!(tree[0].children.as_deref().map(ids), Some(vec![]));
        assert_eq!(tree[1].children.as_deref().map(ids), Some(vec![3]));

        // The grandchild is never materialized anywhere
        let child = &tree[1].children.as_ref().unwrap()[0];
        assert!(child.children.is_none());
        let all: Vec<i64> = tree
            .iter()
            .flat_map(|n| std::iter::once(n.id).chain(n.children.iter().flatten().map(|c| c.id)))
            .collect();
        assert!(!all.contains(&4));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let menus = vec![menu(9, 0, 1), menu(5, 0, 1), menu(12, 9, 3), menu(11, 9, 3), menu(10, 9, 1)];

        let tree = build_tree(&menus);

        assert_eq!(ids(&tree), vec![5, 9]);
        assert_eq!(tree[1].children.as_deref().map(ids), Some(vec![10, 11, 12]));
    }

    #[test]
    fn test_dangling_parent_dropped() {
        let menus = vec![menu(1, 0, 1), menu(2, 1, 1), menu(3, 77, 1)];

        let tree = build_tree(&menus);

        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(tree[0].children.as_deref().map(ids), Some(vec![2]));
    }

    #[test]
    fn test_input_order_irrelevant() {
        let forward = vec![menu(1, 0, 1), menu(2, 0, 2), menu(3, 2, 1), menu(4, 2, 0)];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(build_tree(&forward), build_tree(&reversed));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_node_carries_menu_fields() {
        let mut button = menu(2, 1, 1);
        button.menu_type = MenuType::Button;
        button.permission = Some("user:create".to_string());

        let tree = build_tree(&[menu(1, 0, 1), button]);
        let child = &tree[0].children.as_ref().unwrap()[0];

        assert_eq!(child.menu_type, MenuType::Button);
        assert_eq!(child.permission.as_deref(), Some("user:create"));
        assert_eq!(child.parent_id, 1);
    }

    #[test]
    fn test_serialized_shape() {
        let tree = build_tree(&[menu(1, 0, 1), menu(2, 1, 1)]);
        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json[0]["parentId"], 0);
        assert_eq!(json[0]["menuType"], "menu");
        assert_eq!(json[0]["children"][0]["id"], 2);
        assert!(json[0]["children"][0].get("children").is_none());
    }
}
