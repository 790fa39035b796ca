use crate::error::AnaSkillsError;
use crate::skills::catalog::Catalog;
use crate::skills::types::{Agent, SkillDescriptor};
use anyhow::{Result, anyhow};
use inquire::error::InquireError;
use inquire::{Confirm, MultiSelect, Select};
use std::collections::{BTreeMap, BTreeSet};
use std::io::IsTerminal;

pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Every question the commands ask. `Ok(None)` means the user cancelled.
pub trait SkillPrompter {
    fn select_agent(&mut self) -> Result<Option<Agent>>;

    /// First-run selection over the whole catalog.
    fn select_initial(&mut self, catalog: &Catalog) -> Result<Option<BTreeMap<String, bool>>>;

    /// Answers for skills that appeared since the last sync, grouped by category.
    fn review_new(
        &mut self,
        new_skills: &BTreeMap<&str, Vec<&SkillDescriptor>>,
    ) -> Result<Option<BTreeMap<String, bool>>>;

    /// Full enabled set chosen from the catalog, starting from `current`.
    fn select_enabled(
        &mut self,
        catalog: &Catalog,
        current: &BTreeSet<String>,
    ) -> Result<Option<BTreeSet<String>>>;

    fn select_category(&mut self, skill: &str, categories: &[String]) -> Result<Option<String>>;
}

/// Prompts through the terminal.
pub struct InteractivePrompter;

/// Answers without asking: used when stdin is not a terminal.
pub struct DefaultPrompter {
    /// Accept newly discovered skills instead of leaving them disabled.
    pub accept_new: bool,
}

fn cancellable<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(AnaSkillsError::Inquire(e).into()),
    }
}

fn skill_label(skill: &SkillDescriptor) -> String {
    if skill.description.is_empty() {
        skill.name.clone()
    } else {
        format!("{} - {}", skill.name, skill.description)
    }
}

impl SkillPrompter for InteractivePrompter {
    fn select_agent(&mut self) -> Result<Option<Agent>> {
        let labels: Vec<&str> = Agent::ALL.iter().map(|agent| agent.label()).collect();
        let Some(selected) =
            cancellable(Select::new(&t!("prompts.select_agent"), labels).prompt())?
        else {
            return Ok(None);
        };
        Ok(Agent::ALL
            .into_iter()
            .find(|agent| agent.label() == selected))
    }

    fn select_initial(&mut self, catalog: &Catalog) -> Result<Option<BTreeMap<String, bool>>> {
        let all = t!("prompts.category_all").to_string();
        let none = t!("prompts.category_none").to_string();
        let pick = t!("prompts.category_pick").to_string();
        let mut selections = BTreeMap::new();

        for (category, skills) in catalog.by_category() {
            let names: Vec<&str> = skills.iter().map(|skill| skill.name.as_str()).collect();
            let prompt = t!(
                "prompts.category_choice",
                category = category,
                skills = names.join(", ")
            );
            let options = vec![all.clone(), none.clone(), pick.clone()];
            let Some(choice) = cancellable(Select::new(&prompt, options).prompt())? else {
                return Ok(None);
            };

            if choice == pick {
                let labels: Vec<String> = skills.iter().map(|skill| skill_label(skill)).collect();
                let defaults: Vec<usize> = (0..labels.len()).collect();
                let prompt = t!("prompts.pick_skills", category = category);
                let Some(picked) = cancellable(
                    MultiSelect::new(&prompt, labels.clone())
                        .with_default(&defaults)
                        .prompt(),
                )?
                else {
                    return Ok(None);
                };
                for (skill, label) in skills.iter().zip(labels.iter()) {
                    selections.insert(skill.name.clone(), picked.contains(label));
                }
            } else {
                let on = choice == all;
                for skill in skills {
                    selections.insert(skill.name.clone(), on);
                }
            }
        }
        Ok(Some(selections))
    }

    fn review_new(
        &mut self,
        new_skills: &BTreeMap<&str, Vec<&SkillDescriptor>>,
    ) -> Result<Option<BTreeMap<String, bool>>> {
        let count: usize = new_skills.values().map(Vec::len).sum();
        let prompt = t!("prompts.review_new", count = count);
        let Some(review) = cancellable(Confirm::new(&prompt).with_default(true).prompt())? else {
            return Ok(None);
        };
        let mut answers = BTreeMap::new();
        if !review {
            return Ok(Some(answers));
        }

        for (category, skills) in new_skills {
            println!("{}", t!("prompts.category_header", category = category));
            for skill in skills {
                let prompt = t!("prompts.add_skill", skill = skill_label(skill));
                let Some(add) = cancellable(Confirm::new(&prompt).with_default(true).prompt())?
                else {
                    return Ok(None);
                };
                answers.insert(skill.name.clone(), add);
            }
        }
        Ok(Some(answers))
    }

    fn select_enabled(
        &mut self,
        catalog: &Catalog,
        current: &BTreeSet<String>,
    ) -> Result<Option<BTreeSet<String>>> {
        let skills = catalog.skills();
        let labels: Vec<String> = skills
            .iter()
            .map(|skill| format!("[{}] {}", skill.category, skill_label(skill)))
            .collect();
        let defaults: Vec<usize> = skills
            .iter()
            .enumerate()
            .filter(|(_, skill)| current.contains(&skill.name))
            .map(|(idx, _)| idx)
            .collect();
        let Some(picked) = cancellable(
            MultiSelect::new(&t!("prompts.select_enabled"), labels.clone())
                .with_default(&defaults)
                .with_page_size(15)
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        Ok(Some(
            skills
                .iter()
                .zip(labels.iter())
                .filter(|(_, label)| picked.contains(label))
                .map(|(skill, _)| skill.name.clone())
                .collect(),
        ))
    }

    fn select_category(&mut self, skill: &str, categories: &[String]) -> Result<Option<String>> {
        if categories.is_empty() {
            return Err(anyhow!(t!("upload.no_categories")));
        }
        let prompt = t!("prompts.select_category", skill = skill);
        cancellable(Select::new(&prompt, categories.to_vec()).prompt())
    }
}

impl SkillPrompter for DefaultPrompter {
    fn select_agent(&mut self) -> Result<Option<Agent>> {
        Err(AnaSkillsError::NonInteractive {
            what: "--agent".to_string(),
        }
        .into())
    }

    fn select_initial(&mut self, catalog: &Catalog) -> Result<Option<BTreeMap<String, bool>>> {
        Ok(Some(
            catalog
                .skills()
                .iter()
                .map(|skill| (skill.name.clone(), false))
                .collect(),
        ))
    }

    fn review_new(
        &mut self,
        new_skills: &BTreeMap<&str, Vec<&SkillDescriptor>>,
    ) -> Result<Option<BTreeMap<String, bool>>> {
        Ok(Some(
            new_skills
                .values()
                .flatten()
                .map(|skill| (skill.name.clone(), self.accept_new))
                .collect(),
        ))
    }

    fn select_enabled(
        &mut self,
        _catalog: &Catalog,
        _current: &BTreeSet<String>,
    ) -> Result<Option<BTreeSet<String>>> {
        Err(AnaSkillsError::NonInteractive {
            what: t!("prompts.names_required").to_string(),
        }
        .into())
    }

    fn select_category(&mut self, _skill: &str, _categories: &[String]) -> Result<Option<String>> {
        Err(AnaSkillsError::NonInteractive {
            what: "--category".to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_skill;
    use tempfile::TempDir;

    #[test]
    fn test_cancellation_is_not_an_error() {
        let canceled = cancellable::<String>(Err(InquireError::OperationCanceled)).expect("ok");
        assert!(canceled.is_none());
        let interrupted =
            cancellable::<String>(Err(InquireError::OperationInterrupted)).expect("ok");
        assert!(interrupted.is_none());
    }

    #[test]
    fn test_prompt_failure_keeps_inquire_error() {
        let err = cancellable::<String>(Err(InquireError::NotTTY)).expect_err("not a tty");
        assert!(matches!(
            err.downcast_ref::<AnaSkillsError>(),
            Some(AnaSkillsError::Inquire(InquireError::NotTTY))
        ));
    }

    #[test]
    fn test_default_prompter_needs_explicit_agent() {
        let err = DefaultPrompter { accept_new: false }
            .select_agent()
            .expect_err("non-interactive");
        assert!(matches!(
            err.downcast_ref::<AnaSkillsError>(),
            Some(AnaSkillsError::NonInteractive { .. })
        ));
    }

    #[test]
    fn test_default_prompter_respects_accept_new() {
        let temp = TempDir::new().expect("temp dir");
        write_skill(temp.path(), "angular", "frontend-store", "Stores");
        let catalog = Catalog::load(temp.path()).expect("catalog");
        let grouped = catalog.by_category();

        let declined = DefaultPrompter { accept_new: false }
            .review_new(&grouped)
            .expect("review")
            .expect("answers");
        assert_eq!(declined.get("frontend-store"), Some(&false));

        let accepted = DefaultPrompter { accept_new: true }
            .review_new(&grouped)
            .expect("review")
            .expect("answers");
        assert_eq!(accepted.get("frontend-store"), Some(&true));
    }

    #[test]
    fn test_default_initial_selection_enables_nothing() {
        let temp = TempDir::new().expect("temp dir");
        write_skill(temp.path(), "infra", "mcc-infra", "Infra");
        let catalog = Catalog::load(temp.path()).expect("catalog");
        let selection = DefaultPrompter { accept_new: false }
            .select_initial(&catalog)
            .expect("select")
            .expect("selection");
        assert_eq!(selection.get("mcc-infra"), Some(&false));
    }
}
