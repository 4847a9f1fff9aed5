//! Navigation menu as a tagged-variant tree.
//!
//! One recursive renderer dispatching on the variant replaces the upstream
//! dashboard's triplicated nested-conditional menu blocks.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuNode {
    Leaf {
        label: &'static str,
        link: &'static str,
    },
    Group {
        label: &'static str,
        children: Vec<MenuNode>,
    },
}

impl MenuNode {
    fn leaf(label: &'static str, link: &'static str) -> MenuNode {
        MenuNode::Leaf { label, link }
    }

    fn group(label: &'static str, children: Vec<MenuNode>) -> MenuNode {
        MenuNode::Group { label, children }
    }
}

/// The dashboard menu of the HR front-end.
pub fn dashboard_menu() -> Vec<MenuNode> {
    vec![
        MenuNode::leaf("Dashboard", "/emp"),
        MenuNode::group(
            "Employees",
            vec![
                MenuNode::leaf("List", "/employee-list"),
                MenuNode::leaf("Create", "/employee-create"),
                MenuNode::leaf("Profile", "/emp"),
            ],
        ),
        MenuNode::group(
            "Permissions",
            vec![
                MenuNode::leaf("Request Leave", "/permission-create"),
                MenuNode::leaf("My Requests", "/permissions"),
                MenuNode::leaf("All Requests", "/permission-list"),
            ],
        ),
        MenuNode::group(
            "Advances",
            vec![
                MenuNode::leaf("Request Advance", "/advance-create"),
                MenuNode::leaf("My Advances", "/advances"),
                MenuNode::leaf("All Advances", "/advance-list"),
            ],
        ),
        MenuNode::group(
            "Expenses",
            vec![
                MenuNode::leaf("Submit Expense", "/expense-create"),
                MenuNode::leaf("My Expenses", "/expenses"),
                MenuNode::leaf("All Expenses", "/expense-list"),
            ],
        ),
        MenuNode::group(
            "Account",
            vec![
                MenuNode::leaf("Change Password", "/reset-password"),
                MenuNode::leaf("Sign Out", "/"),
            ],
        ),
    ]
}

/// Render the tree into `out`, two spaces of indent per level.
pub fn render(nodes: &[MenuNode], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            MenuNode::Leaf { label, link } => {
                out.push_str(&format!("{}{}  ({})\n", indent, label, link));
            }
            MenuNode::Group { label, children } => {
                out.push_str(&format!("{}{}/\n", indent, label));
                render(children, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_recurses_with_indentation() {
        let tree = vec![
            MenuNode::leaf("Top", "/top"),
            MenuNode::group(
                "Outer",
                vec![MenuNode::group(
                    "Inner",
                    vec![MenuNode::leaf("Deep", "/deep")],
                )],
            ),
        ];
        let mut out = String::new();
        render(&tree, 0, &mut out);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Top  (/top)");
        assert_eq!(lines[1], "Outer/");
        assert_eq!(lines[2], "  Inner/");
        assert_eq!(lines[3], "    Deep  (/deep)");
    }

    #[test]
    fn dashboard_menu_has_every_section() {
        let mut out = String::new();
        render(&dashboard_menu(), 0, &mut out);
        for section in ["Employees/", "Permissions/", "Advances/", "Expenses/", "Account/"] {
            assert!(out.contains(section), "{}", section);
        }
    }
}
