//! The discovered test tree.
//!
//! A [`TestSuite`] is produced per test source file; its [`TestUnit`]s form
//! a rooted tree mirroring how sub-tests are lexically nested. Both types are
//! built once during discovery and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Separator between ancestry segments of a machine name.
pub const MACHINE_NAME_SEPARATOR: char = '/';

/// All test units discovered in one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Package identifier used as the first half of the result lookup key.
    pub package: String,
    /// Display name (the file's base name).
    pub name: String,
    /// Optional suite-level description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level test functions in declaration order.
    pub units: Vec<TestUnit>,
}

impl TestSuite {
    pub fn new(package: impl Into<String>, name: impl Into<String>, units: Vec<TestUnit>) -> Self {
        TestSuite {
            package: package.into(),
            name: name.into(),
            description: None,
            units,
        }
    }

    /// Total number of units in the suite, sub-tests included.
    pub fn unit_count(&self) -> usize {
        self.units.iter().map(TestUnit::unit_count).sum()
    }

    /// Depth-first, pre-order iteration over every unit in the suite.
    pub fn iter_units(&self) -> impl Iterator<Item = &TestUnit> {
        self.units.iter().flat_map(TestUnit::iter)
    }
}

/// A test function or a sub-test registered inside one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUnit {
    /// Human-readable name, possibly containing expanded loop values.
    pub name: String,
    /// Slash-joined ancestry path as test runners report it.
    pub machine_name: String,
    /// The bound comment block verbatim, markers included. Empty if none.
    #[serde(default)]
    pub comment: String,
    /// Sub-tests in declaration order.
    #[serde(default)]
    pub subtests: Vec<TestUnit>,
}

impl TestUnit {
    /// Create a top-level unit; its machine name starts the ancestry.
    pub fn root(name: impl Into<String>, comment: String, subtests: Vec<TestUnit>) -> Self {
        let name = name.into();
        TestUnit {
            machine_name: machine_segment(&name),
            name,
            comment,
            subtests,
        }
    }

    /// Create a sub-test below the unit whose machine name is `parent_machine`.
    pub fn child(
        parent_machine: &str,
        name: impl Into<String>,
        comment: String,
        subtests: Vec<TestUnit>,
    ) -> Self {
        let name = name.into();
        TestUnit {
            machine_name: child_machine_name(parent_machine, &name),
            name,
            comment,
            subtests,
        }
    }

    /// Number of units in this subtree, including this one.
    pub fn unit_count(&self) -> usize {
        1 + self.subtests.iter().map(TestUnit::unit_count).sum::<usize>()
    }

    /// Depth-first, pre-order iteration over this subtree.
    pub fn iter(&self) -> UnitIter<'_> {
        UnitIter { stack: vec![self] }
    }

    /// Ancestry segments of the machine name, outermost first.
    pub fn ancestry(&self) -> Vec<&str> {
        self.machine_name.split(MACHINE_NAME_SEPARATOR).collect()
    }
}

/// Pre-order iterator over a unit tree.
pub struct UnitIter<'a> {
    stack: Vec<&'a TestUnit>,
}

impl<'a> Iterator for UnitIter<'a> {
    type Item = &'a TestUnit;

    fn next(&mut self) -> Option<Self::Item> {
        let unit = self.stack.pop()?;
        self.stack.extend(unit.subtests.iter().rev());
        Some(unit)
    }
}

/// Machine name of a sub-test: `parent/name` with spaces turned into `_`.
pub fn child_machine_name(parent_machine: &str, name: &str) -> String {
    format!(
        "{}{}{}",
        parent_machine,
        MACHINE_NAME_SEPARATOR,
        machine_segment(name)
    )
}

fn machine_segment(name: &str) -> String {
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(parent: &str, name: &str) -> TestUnit {
        TestUnit::child(parent, name, String::new(), Vec::new())
    }

    mod machine_names {
        use super::*;

        #[test]
        fn child_joins_with_slash() {
            assert_eq!(child_machine_name("TestX", "case_a"), "TestX/case_a");
        }

        #[test]
        fn spaces_become_underscores() {
            let unit = leaf("TestX", "handles empty input");
            assert_eq!(unit.name, "handles empty input");
            assert_eq!(unit.machine_name, "TestX/handles_empty_input");
        }

        #[test]
        fn only_spaces_are_replaced() {
            let unit = leaf("TestX", "tab\there");
            assert_eq!(unit.machine_name, "TestX/tab\there");
        }

        #[test]
        fn ancestry_recovers_each_level() {
            let deep = leaf("TestOuter/middle_level", "inner case");
            assert_eq!(
                deep.ancestry(),
                vec!["TestOuter", "middle_level", "inner_case"]
            );
        }

        #[test]
        fn root_machine_name_is_function_name() {
            let unit = TestUnit::root("TestBasic", String::new(), Vec::new());
            assert_eq!(unit.machine_name, "TestBasic");
            assert_eq!(unit.ancestry(), vec!["TestBasic"]);
        }
    }

    mod traversal {
        use super::*;

        fn sample() -> TestUnit {
            let inner = TestUnit::child(
                "TestA/one",
                "deep",
                String::new(),
                Vec::new(),
            );
            let one = TestUnit::child("TestA", "one", String::new(), vec![inner]);
            let two = leaf("TestA", "two");
            TestUnit::root("TestA", String::new(), vec![one, two])
        }

        #[test]
        fn iter_is_preorder() {
            let root = sample();
            let names: Vec<_> = root.iter().map(|u| u.machine_name.as_str()).collect();
            assert_eq!(names, vec!["TestA", "TestA/one", "TestA/one/deep", "TestA/two"]);
        }

        #[test]
        fn counts_include_subtests() {
            let suite = TestSuite::new("example.com/pkg", "a_test.go", vec![sample()]);
            assert_eq!(suite.unit_count(), 4);
            assert_eq!(suite.iter_units().count(), 4);
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn suite_without_description_omits_field() {
            let suite = TestSuite::new("pkg", "x_test.go", Vec::new());
            let json = serde_json::to_string(&suite).unwrap();
            assert!(!json.contains("description"));
        }
    }
}
