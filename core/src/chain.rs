use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

use crate::{step::MigrationStep, Error, Result};

/// Where a migration run should leave the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Head,
    /// Nothing applied.
    Base,
    /// A revision or a unique prefix of one.
    Revision(String),
    /// A number of steps forwards (positive) or backwards (negative) from the
    /// current revision.
    Relative(i64),
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        match s {
            "" => Err(Error::InvalidTarget(s.to_owned())),
            "head" | "heads" => Ok(Self::Head),
            "base" => Ok(Self::Base),
            _ if s.starts_with(['+', '-']) => s
                .parse::<i64>()
                .map(Self::Relative)
                .map_err(|_| Error::InvalidTarget(s.to_owned())),
            _ if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                Ok(Self::Revision(s.to_owned()))
            },
            _ => Err(Error::InvalidTarget(s.to_owned())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("head"),
            Self::Base => f.write_str("base"),
            Self::Revision(rev) => f.write_str(rev),
            Self::Relative(n) => write!(f, "{n:+}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upgrade,
    Downgrade,
}

/// The steps that move the version record from one revision to another, in
/// the order they must run.
#[derive(Debug)]
pub struct Plan<'a> {
    pub direction: Direction,
    pub steps: Vec<&'a MigrationStep>,
}

impl Plan<'_> {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A validated, linear history of migration steps.
#[derive(Debug, Clone)]
pub struct Chain {
    steps: HashMap<String, MigrationStep>,
    /// Revisions root-first.
    order: Vec<String>,
}

impl Chain {
    /// # Errors
    /// `InvalidChain` if revisions repeat, a predecessor is unknown, the
    /// history branches or has no single root, or a step is not reversible.
    pub fn new(steps: impl IntoIterator<Item = MigrationStep>) -> Result<Self> {
        let mut by_revision = HashMap::new();
        let mut parents = HashSet::new();
        let mut roots = Vec::new();

        for step in steps {
            if !step.is_reversible() {
                return Err(Error::InvalidChain(format!(
                    "{} does not downgrade the exact inverse of its upgrade",
                    step.revision
                )));
            }

            match &step.down_revision {
                None => roots.push(step.revision.clone()),
                Some(parent) if !parents.insert(parent.clone()) => {
                    return Err(Error::InvalidChain(format!(
                        "{parent} has more than one child"
                    )));
                },
                Some(_) => (),
            }

            if let Some(dup) = by_revision.insert(step.revision.clone(), step) {
                return Err(Error::InvalidChain(format!(
                    "revision {} is defined twice",
                    dup.revision
                )));
            }
        }

        if by_revision.is_empty() {
            return Err(Error::InvalidChain("no revisions".into()));
        }

        if let Some(missing) = parents.iter().find(|p| !by_revision.contains_key(*p)) {
            return Err(Error::InvalidChain(format!(
                "down revision {missing} is not part of the chain"
            )));
        }

        if roots.len() != 1 {
            return Err(Error::InvalidChain(format!(
                "expected exactly one root, found {}",
                roots.len()
            )));
        }

        let heads: Vec<_> = by_revision
            .keys()
            .filter(|rev| !parents.contains(*rev))
            .cloned()
            .collect();

        let [head] = heads.as_slice() else {
            return Err(Error::InvalidChain(format!(
                "expected exactly one head, found {}",
                heads.len()
            )));
        };

        let mut order = Vec::with_capacity(by_revision.len());
        let mut cursor = Some(head.clone());

        while let Some(rev) = cursor {
            if order.len() == by_revision.len() {
                return Err(Error::InvalidChain(format!("cycle through {rev}")));
            }
            cursor = by_revision[&rev].down_revision.clone();
            order.push(rev);
        }

        if order.len() != by_revision.len() {
            return Err(Error::InvalidChain(
                "some revisions are not reachable from head".into(),
            ));
        }

        order.reverse();

        Ok(Self {
            steps: by_revision,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, revision: &str) -> Option<&MigrationStep> {
        self.steps.get(revision)
    }

    pub fn head(&self) -> &MigrationStep {
        &self.steps[&self.order[self.order.len() - 1]]
    }

    pub fn root(&self) -> &MigrationStep {
        &self.steps[&self.order[0]]
    }

    /// Steps root-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MigrationStep> + '_ {
        self.order.iter().map(|rev| &self.steps[rev])
    }

    /// Finds the revision matching `prefix`, exactly or as a unique prefix.
    ///
    /// # Errors
    /// `UnknownRevision` or `AmbiguousRevision`.
    pub fn lookup(&self, prefix: &str) -> Result<&MigrationStep> {
        if let Some(step) = self.steps.get(prefix) {
            return Ok(step);
        }

        let mut candidates: Vec<_> = self
            .order
            .iter()
            .filter(|rev| rev.starts_with(prefix))
            .collect();

        match candidates.len() {
            0 => Err(Error::UnknownRevision(prefix.to_owned())),
            1 => Ok(&self.steps[candidates.remove(0)]),
            _ => Err(Error::AmbiguousRevision {
                prefix: prefix.to_owned(),
                candidates: candidates.into_iter().cloned().collect(),
            }),
        }
    }

    /// Walks `down_revision` links from `target` back to the root and returns
    /// the steps root-first.
    ///
    /// # Errors
    /// `UnknownRevision` if `target` names no step.
    pub fn resolve(&self, target: &str) -> Result<Vec<&MigrationStep>> {
        let mut path = vec![self.lookup(target)?];

        while let Some(parent) = path.last().copied().and_then(|s| s.down_revision.as_deref()) {
            path.push(
                self.steps
                    .get(parent)
                    .ok_or_else(|| Error::UnknownRevision(parent.to_owned()))?,
            );
        }

        path.reverse();

        Ok(path)
    }

    /// Number of steps applied when the version record reads `revision`.
    fn depth(&self, revision: Option<&str>) -> Result<usize> {
        match revision {
            None => Ok(0),
            Some(rev) => self
                .order
                .iter()
                .position(|r| r == rev)
                .map(|i| i + 1)
                .ok_or_else(|| Error::UnknownRevision(rev.to_owned())),
        }
    }

    /// Resolves `target` to the revision the version record should end at,
    /// `None` meaning base.
    ///
    /// # Errors
    /// `UnknownRevision`, `AmbiguousRevision`, or `InvalidTarget` for relative
    /// moves past head or base.
    pub fn target_revision(&self, current: Option<&str>, target: &Target) -> Result<Option<&str>> {
        match target {
            Target::Head => Ok(Some(self.head().revision.as_str())),
            Target::Base => Ok(None),
            Target::Revision(rev) => Ok(Some(self.lookup(rev)?.revision.as_str())),
            Target::Relative(n) => {
                let depth = i64::try_from(self.depth(current)?)
                    .map_err(|_| Error::InvalidTarget(target.to_string()))?;
                let len = i64::try_from(self.len())
                    .map_err(|_| Error::InvalidTarget(target.to_string()))?;
                let to = depth + n;

                if !(0..=len).contains(&to) {
                    return Err(Error::InvalidTarget(target.to_string()));
                }

                let to = usize::try_from(to).map_err(|_| Error::InvalidTarget(target.to_string()))?;

                Ok(to.checked_sub(1).map(|i| self.order[i].as_str()))
            },
        }
    }

    /// The steps that take the schema from `current` to `target`.
    ///
    /// # Errors
    /// Any error of [`Chain::target_revision`], or `UnknownRevision` if
    /// `current` is not part of this chain.
    pub fn plan(&self, current: Option<&str>, target: &Target) -> Result<Plan<'_>> {
        let from = self.depth(current)?;
        let to = self.depth(self.target_revision(current, target)?)?;

        let plan = if to >= from {
            Plan {
                direction: Direction::Upgrade,
                steps: self.order[from..to].iter().map(|r| &self.steps[r]).collect(),
            }
        } else {
            Plan {
                direction: Direction::Downgrade,
                steps: self.order[to..from]
                    .iter()
                    .rev()
                    .map(|r| &self.steps[r])
                    .collect(),
            }
        };

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::{Chain, Direction, Target};
    use crate::{ops::SchemaOp, step::MigrationStep, Error};

    fn step(rev: &str, down: Option<&str>) -> MigrationStep {
        MigrationStep::new(rev, down, format!("step {rev}"))
            .upgrade(SchemaOp::rename_table(format!("t_{rev}"), format!("u_{rev}")))
            .downgrade(SchemaOp::rename_table(format!("u_{rev}"), format!("t_{rev}")))
    }

    fn abc() -> Chain {
        // deliberately out of order
        Chain::new([
            step("ccc3", Some("bbb2")),
            step("aaa1", None),
            step("bbb2", Some("aaa1")),
        ])
        .unwrap()
    }

    fn revisions<'a>(steps: impl IntoIterator<Item = &'a MigrationStep>) -> Vec<&'a str> {
        steps.into_iter().map(|s| s.revision.as_str()).collect()
    }

    #[test]
    fn orders_root_first() {
        let chain = abc();

        assert_eq!(revisions(chain.iter()), ["aaa1", "bbb2", "ccc3"]);
        assert_eq!(chain.root().revision, "aaa1");
        assert_eq!(chain.head().revision, "ccc3");
    }

    #[test]
    fn resolve_walks_down_revisions() {
        let chain = abc();

        assert_eq!(revisions(chain.resolve("ccc3").unwrap()), ["aaa1", "bbb2", "ccc3"]);
        assert_eq!(revisions(chain.resolve("bbb2").unwrap()), ["aaa1", "bbb2"]);
        assert!(matches!(
            chain.resolve("zzz"),
            Err(Error::UnknownRevision(r)) if r == "zzz"
        ));
    }

    #[test]
    fn lookup_accepts_unique_prefix() {
        let chain = Chain::new([step("abc1", None), step("abd2", Some("abc1"))]).unwrap();

        assert_eq!(chain.lookup("abc").unwrap().revision, "abc1");
        assert!(matches!(
            chain.lookup("ab"),
            Err(Error::AmbiguousRevision { candidates, .. }) if candidates == ["abc1", "abd2"]
        ));
    }

    #[test]
    fn rejects_malformed_chains() {
        let cases = [
            vec![],
            vec![step("a", None), step("a", None)],
            vec![step("a", None), step("b", Some("x"))],
            vec![step("a", None), step("b", None)],
            vec![step("a", None), step("b", Some("a")), step("c", Some("a"))],
            vec![step("a", None), step("b", Some("c")), step("c", Some("b"))],
            vec![MigrationStep::new("a", None, "irreversible")
                .upgrade(SchemaOp::rename_table("t", "u"))],
        ];

        for steps in cases {
            assert!(matches!(Chain::new(steps), Err(Error::InvalidChain(_))));
        }
    }

    #[test]
    fn parses_targets() {
        assert_eq!("head".parse::<Target>().unwrap(), Target::Head);
        assert_eq!("base".parse::<Target>().unwrap(), Target::Base);
        assert_eq!("-1".parse::<Target>().unwrap(), Target::Relative(-1));
        assert_eq!("+2".parse::<Target>().unwrap(), Target::Relative(2));
        assert_eq!(
            "f279".parse::<Target>().unwrap(),
            Target::Revision("f279".into())
        );

        for bad in ["", "+x", "f27 9", "a;b"] {
            assert!(matches!(bad.parse::<Target>(), Err(Error::InvalidTarget(_))));
        }
    }

    #[test]
    fn plans_upgrades_and_downgrades() {
        let chain = abc();

        let plan = chain.plan(None, &Target::Head).unwrap();
        assert_eq!(plan.direction, Direction::Upgrade);
        assert_eq!(revisions(plan.steps), ["aaa1", "bbb2", "ccc3"]);

        let plan = chain.plan(Some("aaa1"), &Target::Revision("bbb".into())).unwrap();
        assert_eq!(plan.direction, Direction::Upgrade);
        assert_eq!(revisions(plan.steps), ["bbb2"]);

        let plan = chain.plan(Some("ccc3"), &Target::Base).unwrap();
        assert_eq!(plan.direction, Direction::Downgrade);
        assert_eq!(revisions(plan.steps), ["ccc3", "bbb2", "aaa1"]);

        let plan = chain.plan(Some("ccc3"), &Target::Relative(-1)).unwrap();
        assert_eq!(plan.direction, Direction::Downgrade);
        assert_eq!(revisions(plan.steps), ["ccc3"]);

        assert!(chain.plan(Some("ccc3"), &Target::Head).unwrap().is_empty());
    }

    #[test]
    fn relative_targets_stay_within_the_chain() {
        let chain = abc();

        assert!(matches!(
            chain.plan(Some("ccc3"), &Target::Relative(1)),
            Err(Error::InvalidTarget(t)) if t == "+1"
        ));
        assert!(matches!(
            chain.plan(None, &Target::Relative(-1)),
            Err(Error::InvalidTarget(_))
        ));
        assert_eq!(
            chain.target_revision(Some("aaa1"), &Target::Relative(-1)).unwrap(),
            None
        );
    }

    #[test]
    fn plan_rejects_unknown_current_revision() {
        assert!(matches!(
            abc().plan(Some("0000"), &Target::Head),
            Err(Error::UnknownRevision(r)) if r == "0000"
        ));
    }
}
