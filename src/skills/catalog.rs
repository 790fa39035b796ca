use crate::error::AnaSkillsError;
use crate::path_utils::is_single_component;
use crate::skills::frontmatter;
use crate::skills::types::{SKILL_FILE, SkillDescriptor};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Skills available under `<root>/<category>/<skill>/SKILL.md`.
#[derive(Debug, Default)]
pub struct Catalog {
    root: PathBuf,
    skills: Vec<SkillDescriptor>,
}

impl Catalog {
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(AnaSkillsError::CatalogMissing {
                path: root.display().to_string(),
            }
            .into());
        }

        let mut skills: Vec<SkillDescriptor> = Vec::new();
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        let mut published: BTreeMap<String, String> = BTreeMap::new();
        for category in list_visible_dirs(root)? {
            let category_dir = root.join(&category);
            for skill_name in list_visible_dirs(&category_dir)? {
                let dir = category_dir.join(&skill_name);
                if !dir.join(SKILL_FILE).is_file() {
                    debug!(dir = %dir.display(), "no SKILL.md, not a skill");
                    continue;
                }
                if let Some(owner) = seen.get(&skill_name) {
                    warn!(
                        skill = %skill_name,
                        kept = %owner,
                        ignored = %category,
                        "duplicate skill name in catalog"
                    );
                    continue;
                }
                let descriptor = describe(&category, &skill_name, &dir)?;
                if let Some(owner) = published.get(&descriptor.title) {
                    warn!(
                        skill = %skill_name,
                        published = %descriptor.title,
                        kept = %owner,
                        "duplicate published skill name in catalog"
                    );
                    continue;
                }
                published.insert(descriptor.title.clone(), skill_name.clone());
                seen.insert(skill_name, category.clone());
                skills.push(descriptor);
            }
        }

        debug!(root = %root.display(), count = skills.len(), "catalog loaded");
        Ok(Self {
            root: root.to_path_buf(),
            skills,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Skills ordered by category, then name.
    pub fn skills(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SkillDescriptor> {
        self.skills.iter().find(|skill| skill.name == name)
    }

    /// Looks a skill up by catalog key, then by the published frontmatter
    /// name that `sync` uses in destinations.
    pub fn find_published(&self, published: &str) -> Option<&SkillDescriptor> {
        self.get(published)
            .or_else(|| self.skills.iter().find(|skill| skill.title == published))
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.skills.iter().map(|skill| skill.name.clone()).collect()
    }

    /// Every category directory, including ones without skills yet.
    pub fn category_dirs(&self) -> Result<Vec<String>> {
        list_visible_dirs(&self.root)
    }

    pub fn by_category(&self) -> BTreeMap<&str, Vec<&SkillDescriptor>> {
        let mut grouped: BTreeMap<&str, Vec<&SkillDescriptor>> = BTreeMap::new();
        for skill in &self.skills {
            grouped.entry(skill.category.as_str()).or_default().push(skill);
        }
        grouped
    }

    pub fn skill_dir(&self, category: &str, name: &str) -> PathBuf {
        self.root.join(category).join(name)
    }
}

fn describe(category: &str, name: &str, dir: &Path) -> Result<SkillDescriptor> {
    let content = fs::read_to_string(dir.join(SKILL_FILE))?;
    let (meta, _) = frontmatter::parse(&content);
    let title = match meta.name.filter(|title| !title.is_empty()) {
        Some(title) if is_single_component(&title) => title,
        Some(title) => {
            warn!(
                skill = %name,
                published = %title,
                "frontmatter name is not a plain file name, using directory name"
            );
            name.to_string()
        }
        None => name.to_string(),
    };
    Ok(SkillDescriptor {
        name: name.to_string(),
        category: category.to_string(),
        description: meta.description.unwrap_or_default(),
        title,
        dir: dir.to_path_buf(),
    })
}

fn list_visible_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_skill;
    use tempfile::TempDir;

    #[test]
    fn test_load_groups_by_category() {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path();
        write_skill(root, "angular", "frontend-store", "Stores");
        write_skill(root, "angular", "frontend-component", "Components");
        write_skill(root, "infra", "mcc-infra", "Infra");

        let catalog = Catalog::load(root).expect("catalog");
        let names: Vec<&str> = catalog.skills().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["frontend-component", "frontend-store", "mcc-infra"]
        );
        assert_eq!(
            catalog.by_category().keys().copied().collect::<Vec<_>>(),
            vec!["angular", "infra"]
        );
        assert_eq!(
            catalog.get("mcc-infra").map(|s| s.description.as_str()),
            Some("Infra")
        );
    }

    #[test]
    fn test_skips_hidden_and_incomplete_dirs() {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path();
        write_skill(root, ".hidden", "secret", "x");
        write_skill(root, "testing", ".draft", "x");
        fs::create_dir_all(root.join("testing").join("no-skill-md")).expect("mkdir");
        fs::create_dir_all(root.join("empty-category")).expect("mkdir");
        fs::write(root.join("README.md"), "# catalog").expect("write readme");
        write_skill(root, "testing", "test-python-integration", "Tests");

        let catalog = Catalog::load(root).expect("catalog");
        assert_eq!(
            catalog.names().into_iter().collect::<Vec<_>>(),
            vec!["test-python-integration".to_string()]
        );
        assert_eq!(
            catalog.by_category().keys().copied().collect::<Vec<_>>(),
            vec!["testing"]
        );
        assert_eq!(
            catalog.category_dirs().expect("dirs"),
            vec!["empty-category", "testing"]
        );
    }

    #[test]
    fn test_duplicate_names_keep_first_category() {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path();
        write_skill(root, "alpha", "shared", "from alpha");
        write_skill(root, "beta", "shared", "from beta");

        let catalog = Catalog::load(root).expect("catalog");
        assert_eq!(catalog.skills().len(), 1);
        assert_eq!(catalog.get("shared").expect("skill").category, "alpha");
    }

    #[test]
    fn test_title_falls_back_to_dir_name() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("misc").join("bare");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join(SKILL_FILE), "# Bare skill\n").expect("write");

        let catalog = Catalog::load(temp.path()).expect("catalog");
        let skill = catalog.get("bare").expect("skill");
        assert_eq!(skill.title, "bare");
        assert_eq!(skill.description, "");
    }

    #[test]
    fn test_path_like_titles_fall_back_to_dir_name() {
        let temp = TempDir::new().expect("temp dir");
        for (dir_name, title) in [("escape", "../../pwned"), ("dots", ".."), ("nested", "a/b")] {
            let dir = temp.path().join("misc").join(dir_name);
            fs::create_dir_all(&dir).expect("mkdir");
            fs::write(
                dir.join(SKILL_FILE),
                format!("---\nname: \"{title}\"\n---\nBody\n"),
            )
            .expect("write");
        }

        let catalog = Catalog::load(temp.path()).expect("catalog");
        for dir_name in ["escape", "dots", "nested"] {
            assert_eq!(catalog.get(dir_name).expect("skill").title, dir_name);
        }
    }

    #[test]
    fn test_duplicate_published_names_keep_first() {
        let temp = TempDir::new().expect("temp dir");
        for dir_name in ["store-v1", "store-v2"] {
            let dir = temp.path().join("angular").join(dir_name);
            fs::create_dir_all(&dir).expect("mkdir");
            fs::write(dir.join(SKILL_FILE), "---\nname: store\n---\nBody\n").expect("write");
        }

        let catalog = Catalog::load(temp.path()).expect("catalog");
        assert_eq!(
            catalog.names().into_iter().collect::<Vec<_>>(),
            vec!["store-v1".to_string()]
        );
        assert_eq!(catalog.find_published("store").expect("skill").name, "store-v1");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let err = Catalog::load(&temp.path().join("nope")).expect_err("missing");
        assert!(err.downcast_ref::<AnaSkillsError>().is_some());
    }
}
