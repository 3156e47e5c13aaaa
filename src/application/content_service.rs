use uuid::Uuid;

use crate::domain::content::{
    InfoCard, InfoCardUpdate, Notice, NoticeInput, Showcase, ShowcaseInput, ShowcaseKind,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContentRepository;

pub const DEFAULT_BANNER_POSITION: &str = "home";

pub struct ContentService<T> {
    repo: T,
}

impl<T: ContentRepository> ContentService<T> {
    pub fn new(repo: T) -> Self {
        Self { repo }
    }

    pub fn list(&self, kind: ShowcaseKind, active_only: bool) -> Result<Vec<Showcase>, DomainError> {
        self.repo.list_showcases(kind, active_only)
    }

    pub fn get(&self, kind: ShowcaseKind, id: Uuid) -> Result<Showcase, DomainError> {
        self.repo
            .find_showcase(kind, id)?
            .ok_or(DomainError::NotFound(kind.label()))
    }

    /// Sliders carry no position; banners default to the home page.
    fn normalize(kind: ShowcaseKind, mut input: ShowcaseInput) -> ShowcaseInput {
        input.position = match kind {
            ShowcaseKind::Slider => None,
            ShowcaseKind::Banner => Some(
                input
                    .position
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BANNER_POSITION.to_string()),
            ),
        };
        input
    }

    pub fn create(&self, kind: ShowcaseKind, input: ShowcaseInput) -> Result<Showcase, DomainError> {
        input.validate()?;
        let showcase = self.repo.create_showcase(kind, &Self::normalize(kind, input))?;
        log::info!("{} '{}' created", kind.label(), showcase.title);
        Ok(showcase)
    }

    pub fn update(
        &self,
        kind: ShowcaseKind,
        id: Uuid,
        input: ShowcaseInput,
    ) -> Result<Showcase, DomainError> {
        input.validate()?;
        self.repo
            .update_showcase(kind, id, &Self::normalize(kind, input))?
            .ok_or(DomainError::NotFound(kind.label()))
    }

    pub fn delete(&self, kind: ShowcaseKind, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_showcase(kind, id)? {
            return Err(DomainError::NotFound(kind.label()));
        }
        Ok(())
    }

    pub fn notices(&self, active_only: bool) -> Result<Vec<Notice>, DomainError> {
        self.repo.list_notices(active_only)
    }

    pub fn create_notice(&self, input: NoticeInput) -> Result<Notice, DomainError> {
        input.validate()?;
        let input = NoticeInput {
            text: input.text.trim().to_string(),
            ..input
        };
        self.repo.create_notice(&input)
    }

    pub fn delete_notice(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_notice(id)? {
            return Err(DomainError::NotFound("Notice"));
        }
        Ok(())
    }

    pub fn info_cards(&self, active_only: bool) -> Result<Vec<InfoCard>, DomainError> {
        self.repo.list_info_cards(active_only)
    }

    pub fn update_info_card(
        &self,
        id: Uuid,
        update: InfoCardUpdate,
    ) -> Result<InfoCard, DomainError> {
        update.validate()?;
        let update = InfoCardUpdate {
            title: update.title.trim().to_string(),
            subtitle: update.subtitle.trim().to_string(),
            ..update
        };
        let card = self
            .repo
            .update_info_card(id, &update)?
            .ok_or(DomainError::NotFound("Info card"))?;
        log::info!("Info card '{}' updated", card.title);
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::FakeContent;

    fn input(title: &str, sort_order: i32) -> ShowcaseInput {
        ShowcaseInput {
            title: title.to_string(),
            description: None,
            image_url: format!("sliders/{title}.jpg"),
            link_url: None,
            position: None,
            sort_order,
            is_active: true,
        }
    }

    #[test]
    fn zero_sort_order_puts_entry_first() {
        let service = ContentService::new(FakeContent::default());
        service.create(ShowcaseKind::Slider, input("a", 1)).expect("a");
        service.create(ShowcaseKind::Slider, input("b", 2)).expect("b");
        service.create(ShowcaseKind::Slider, input("c", 0)).expect("c");

        let titles: Vec<(String, i32)> = service
            .list(ShowcaseKind::Slider, true)
            .expect("list")
            .into_iter()
            .map(|s| (s.title, s.sort_order))
            .collect();
        assert_eq!(
            titles,
            vec![
                ("c".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 3)
            ]
        );
    }

    #[test]
    fn banners_default_to_home_and_sliders_drop_position() {
        let service = ContentService::new(FakeContent::default());
        let banner = service
            .create(ShowcaseKind::Banner, input("sale", 1))
            .expect("banner");
        assert_eq!(banner.position.as_deref(), Some(DEFAULT_BANNER_POSITION));

        let slider = service
            .create(
                ShowcaseKind::Slider,
                ShowcaseInput {
                    position: Some("sidebar".to_string()),
                    ..input("hero", 1)
                },
            )
            .expect("slider");
        assert!(slider.position.is_none());
    }

    fn card(title: &str, sort_order: i32) -> InfoCard {
        InfoCard {
            id: Uuid::new_v4(),
            title: title.to_string(),
            subtitle: "Conditions apply".to_string(),
            icon_type: "heroicon".to_string(),
            icon_data: "TruckIcon".to_string(),
            bg_color: "bg-green-50".to_string(),
            text_color: "text-green-600".to_string(),
            border_color: "border-green-200".to_string(),
            sort_order,
            is_active: true,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn info_cards_are_retitled_and_hidden_in_place() {
        let repo = FakeContent::default();
        let returns = card("7 day returns", 2);
        repo.state.lock().expect("lock").info_cards =
            vec![returns.clone(), card("Free delivery", 1)];
        let service = ContentService::new(repo);

        let updated = service
            .update_info_card(
                returns.id,
                InfoCardUpdate {
                    title: "  14 day returns ".to_string(),
                    subtitle: "No questions asked".to_string(),
                    is_active: false,
                },
            )
            .expect("updated");
        assert_eq!(updated.title, "14 day returns");
        assert_eq!(updated.icon_data, "TruckIcon");
        assert_eq!(updated.sort_order, 2);

        let active: Vec<String> = service
            .info_cards(true)
            .expect("list")
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(active, vec!["Free delivery".to_string()]);
        let all: Vec<i32> = service
            .info_cards(false)
            .expect("list")
            .into_iter()
            .map(|c| c.sort_order)
            .collect();
        assert_eq!(all, vec![1, 2]);
    }

    #[test]
    fn unknown_info_card_is_not_found_and_blank_title_rejected() {
        let service = ContentService::new(FakeContent::default());
        let update = InfoCardUpdate {
            title: "Secure payment".to_string(),
            subtitle: "Your details stay private".to_string(),
            is_active: true,
        };
        assert!(matches!(
            service.update_info_card(Uuid::new_v4(), update.clone()),
            Err(DomainError::NotFound("Info card"))
        ));
        let blank = InfoCardUpdate {
            title: " ".to_string(),
            ..update
        };
        assert!(matches!(
            service.update_info_card(Uuid::new_v4(), blank),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn missing_banner_is_not_found() {
        let service = ContentService::new(FakeContent::default());
        assert!(matches!(
            service.delete(ShowcaseKind::Banner, Uuid::new_v4()),
            Err(DomainError::NotFound("Banner"))
        ));
    }
}
