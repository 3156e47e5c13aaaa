use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::content::{
    InfoCard, InfoCardUpdate, Notice, NoticeInput, Showcase, ShowcaseInput, ShowcaseKind,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContentRepository;
use crate::schema::{banners, info_cards, notices, sliders};

use super::models::{
    BannerFields, BannerRow, InfoCardChanges, InfoCardRow, NewNoticeRow, NoticeRow, SliderFields,
    SliderRow,
};

#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn from_slider(row: SliderRow) -> Showcase {
    Showcase {
        id: row.id,
        title: row.title,
        description: row.description,
        image_url: row.image_url,
        link_url: row.link_url,
        position: None,
        sort_order: row.sort_order,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

fn from_banner(row: BannerRow) -> Showcase {
    Showcase {
        id: row.id,
        title: row.title,
        description: row.description,
        image_url: row.image_url,
        link_url: row.link_url,
        position: Some(row.position),
        sort_order: row.sort_order,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

fn from_notice(row: NoticeRow) -> Notice {
    Notice {
        id: row.id,
        text: row.text,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

fn from_info_card(row: InfoCardRow) -> InfoCard {
    InfoCard {
        id: row.id,
        title: row.title,
        subtitle: row.subtitle,
        icon_type: row.icon_type,
        icon_data: row.icon_data,
        bg_color: row.bg_color,
        text_color: row.text_color,
        border_color: row.border_color,
        sort_order: row.sort_order,
        is_active: row.is_active,
        updated_at: row.updated_at,
    }
}

fn slider_fields(input: &ShowcaseInput, sort_order: i32) -> SliderFields<'_> {
    SliderFields {
        title: &input.title,
        description: input.description.as_deref(),
        image_url: &input.image_url,
        link_url: input.link_url.as_deref(),
        sort_order,
        is_active: input.is_active,
    }
}

fn banner_fields(input: &ShowcaseInput, sort_order: i32) -> BannerFields<'_> {
    BannerFields {
        title: &input.title,
        description: input.description.as_deref(),
        image_url: &input.image_url,
        link_url: input.link_url.as_deref(),
        position: input.position.as_deref().unwrap_or("home"),
        sort_order,
        is_active: input.is_active,
    }
}

/// A requested sort order of 0 pushes every other entry down one place and
/// takes slot 1. Must run inside the caller's transaction.
fn make_room(
    conn: &mut PgConnection,
    kind: ShowcaseKind,
    requested: i32,
    except: Option<Uuid>,
) -> QueryResult<i32> {
    if requested != 0 {
        return Ok(requested);
    }
    let except = except.unwrap_or_else(Uuid::nil);
    match kind {
        ShowcaseKind::Slider => {
            diesel::update(sliders::table.filter(sliders::id.ne(except)))
                .set(sliders::sort_order.eq(sliders::sort_order + 1))
                .execute(conn)?;
        }
        ShowcaseKind::Banner => {
            diesel::update(banners::table.filter(banners::id.ne(except)))
                .set(banners::sort_order.eq(banners::sort_order + 1))
                .execute(conn)?;
        }
    }
    Ok(1)
}

impl ContentRepository for DieselContentRepository {
    fn list_showcases(
        &self,
        kind: ShowcaseKind,
        active_only: bool,
    ) -> Result<Vec<Showcase>, DomainError> {
        let mut conn = self.pool.get()?;
        match kind {
            ShowcaseKind::Slider => {
                let mut query = sliders::table.into_boxed();
                if active_only {
                    query = query.filter(sliders::is_active.eq(true));
                }
                Ok(query
                    .select(SliderRow::as_select())
                    .order((sliders::sort_order.asc(), sliders::created_at.asc()))
                    .load(&mut conn)?
                    .into_iter()
                    .map(from_slider)
                    .collect())
            }
            ShowcaseKind::Banner => {
                let mut query = banners::table.into_boxed();
                if active_only {
                    query = query.filter(banners::is_active.eq(true));
                }
                Ok(query
                    .select(BannerRow::as_select())
                    .order((banners::sort_order.asc(), banners::created_at.asc()))
                    .load(&mut conn)?
                    .into_iter()
                    .map(from_banner)
                    .collect())
            }
        }
    }

    fn find_showcase(&self, kind: ShowcaseKind, id: Uuid) -> Result<Option<Showcase>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(match kind {
            ShowcaseKind::Slider => sliders::table
                .find(id)
                .select(SliderRow::as_select())
                .first(&mut conn)
                .optional()?
                .map(from_slider),
            ShowcaseKind::Banner => banners::table
                .find(id)
                .select(BannerRow::as_select())
                .first(&mut conn)
                .optional()?
                .map(from_banner),
        })
    }

    fn create_showcase(
        &self,
        kind: ShowcaseKind,
        input: &ShowcaseInput,
    ) -> Result<Showcase, DomainError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::new_v4();

        conn.transaction::<_, DomainError, _>(|conn| {
            let sort_order = make_room(conn, kind, input.sort_order, None)?;
            Ok(match kind {
                ShowcaseKind::Slider => from_slider(
                    diesel::insert_into(sliders::table)
                        .values((sliders::id.eq(id), &slider_fields(input, sort_order)))
                        .returning(SliderRow::as_returning())
                        .get_result(conn)?,
                ),
                ShowcaseKind::Banner => from_banner(
                    diesel::insert_into(banners::table)
                        .values((banners::id.eq(id), &banner_fields(input, sort_order)))
                        .returning(BannerRow::as_returning())
                        .get_result(conn)?,
                ),
            })
        })
    }

    fn update_showcase(
        &self,
        kind: ShowcaseKind,
        id: Uuid,
        input: &ShowcaseInput,
    ) -> Result<Option<Showcase>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let exists = match kind {
                ShowcaseKind::Slider => diesel::select(diesel::dsl::exists(sliders::table.find(id)))
                    .get_result::<bool>(conn)?,
                ShowcaseKind::Banner => diesel::select(diesel::dsl::exists(banners::table.find(id)))
                    .get_result::<bool>(conn)?,
            };
            if !exists {
                return Ok(None);
            }

            let sort_order = make_room(conn, kind, input.sort_order, Some(id))?;
            Ok(Some(match kind {
                ShowcaseKind::Slider => from_slider(
                    diesel::update(sliders::table.find(id))
                        .set(&slider_fields(input, sort_order))
                        .returning(SliderRow::as_returning())
                        .get_result(conn)?,
                ),
                ShowcaseKind::Banner => from_banner(
                    diesel::update(banners::table.find(id))
                        .set(&banner_fields(input, sort_order))
                        .returning(BannerRow::as_returning())
                        .get_result(conn)?,
                ),
            }))
        })
    }

    fn delete_showcase(&self, kind: ShowcaseKind, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = match kind {
            ShowcaseKind::Slider => diesel::delete(sliders::table.find(id)).execute(&mut conn)?,
            ShowcaseKind::Banner => diesel::delete(banners::table.find(id)).execute(&mut conn)?,
        };
        Ok(deleted > 0)
    }

    fn list_notices(&self, active_only: bool) -> Result<Vec<Notice>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = notices::table.into_boxed();
        if active_only {
            query = query.filter(notices::is_active.eq(true));
        }
        Ok(query
            .select(NoticeRow::as_select())
            .order(notices::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(from_notice)
            .collect())
    }

    fn create_notice(&self, input: &NoticeInput) -> Result<Notice, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(notices::table)
            .values(&NewNoticeRow {
                id: Uuid::new_v4(),
                text: &input.text,
                is_active: input.is_active,
            })
            .returning(NoticeRow::as_returning())
            .get_result(&mut conn)?;
        Ok(from_notice(row))
    }

    fn delete_notice(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(notices::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn list_info_cards(&self, active_only: bool) -> Result<Vec<InfoCard>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = info_cards::table.into_boxed();
        if active_only {
            query = query.filter(info_cards::is_active.eq(true));
        }
        Ok(query
            .select(InfoCardRow::as_select())
            .order((info_cards::sort_order.asc(), info_cards::created_at.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(from_info_card)
            .collect())
    }

    fn update_info_card(
        &self,
        id: Uuid,
        update: &InfoCardUpdate,
    ) -> Result<Option<InfoCard>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(info_cards::table.find(id))
            .set(&InfoCardChanges {
                title: &update.title,
                subtitle: &update.subtitle,
                is_active: update.is_active,
                updated_at: chrono::Utc::now(),
            })
            .returning(InfoCardRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(from_info_card))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselContentRepository;
    use crate::domain::content::{InfoCardUpdate, NoticeInput, ShowcaseInput, ShowcaseKind};
    use crate::domain::ports::ContentRepository;
    use crate::infrastructure::test_db::setup_db;

    fn input(title: &str, sort_order: i32, position: Option<&str>) -> ShowcaseInput {
        ShowcaseInput {
            title: title.to_string(),
            description: None,
            image_url: format!("uploads/{title}.jpg"),
            link_url: None,
            position: position.map(str::to_string),
            sort_order,
            is_active: true,
        }
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn zero_sort_order_shifts_existing_sliders() {
        let (_container, pool) = setup_db().await;
        let repo = DieselContentRepository::new(pool);

        repo.create_showcase(ShowcaseKind::Slider, &input("a", 1, None))
            .expect("a");
        repo.create_showcase(ShowcaseKind::Slider, &input("b", 2, None))
            .expect("b");
        let first = repo
            .create_showcase(ShowcaseKind::Slider, &input("c", 0, None))
            .expect("c");
        assert_eq!(first.sort_order, 1);

        let order: Vec<(String, i32)> = repo
            .list_showcases(ShowcaseKind::Slider, false)
            .expect("list")
            .into_iter()
            .map(|s| (s.title, s.sort_order))
            .collect();
        assert_eq!(
            order,
            vec![
                ("c".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 3)
            ]
        );
        // Banners are a separate ordering.
        assert!(repo
            .list_showcases(ShowcaseKind::Banner, false)
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn banner_update_keeps_position_and_unknown_id_is_none() {
        let (_container, pool) = setup_db().await;
        let repo = DieselContentRepository::new(pool);

        let banner = repo
            .create_showcase(ShowcaseKind::Banner, &input("sale", 1, Some("sidebar")))
            .expect("created");
        let mut changed = input("sale", 3, Some("sidebar"));
        changed.is_active = false;
        let updated = repo
            .update_showcase(ShowcaseKind::Banner, banner.id, &changed)
            .expect("query")
            .expect("exists");
        assert_eq!(updated.position.as_deref(), Some("sidebar"));
        assert_eq!(updated.sort_order, 3);
        assert!(repo
            .list_showcases(ShowcaseKind::Banner, true)
            .expect("list")
            .is_empty());

        assert!(repo
            .update_showcase(ShowcaseKind::Banner, Uuid::new_v4(), &changed)
            .expect("query")
            .is_none());
        assert!(!repo
            .delete_showcase(ShowcaseKind::Slider, banner.id)
            .expect("query"));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn notices_filter_inactive() {
        let (_container, pool) = setup_db().await;
        let repo = DieselContentRepository::new(pool);
        repo.create_notice(&NoticeInput {
            text: "Free delivery inside Dhaka".to_string(),
            is_active: true,
        })
        .expect("created");
        let hidden = repo
            .create_notice(&NoticeInput {
                text: "Old offer".to_string(),
                is_active: false,
            })
            .expect("created");

        assert_eq!(repo.list_notices(true).expect("list").len(), 1);
        assert_eq!(repo.list_notices(false).expect("list").len(), 2);
        assert!(repo.delete_notice(hidden.id).expect("deleted"));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn seeded_info_cards_can_be_hidden() {
        let (_container, pool) = setup_db().await;
        let repo = DieselContentRepository::new(pool);

        let cards = repo.list_info_cards(true).expect("list");
        assert_eq!(cards.len(), 5);
        let order: Vec<i32> = cards.iter().map(|c| c.sort_order).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);

        let first = &cards[0];
        let hidden = repo
            .update_info_card(
                first.id,
                &InfoCardUpdate {
                    title: "Free delivery in Dhaka".to_string(),
                    subtitle: first.subtitle.clone(),
                    is_active: false,
                },
            )
            .expect("query")
            .expect("exists");
        assert_eq!(hidden.title, "Free delivery in Dhaka");
        assert_eq!(hidden.icon_data, first.icon_data);
        assert_eq!(repo.list_info_cards(true).expect("list").len(), 4);
        assert_eq!(repo.list_info_cards(false).expect("list").len(), 5);

        let missing = InfoCardUpdate {
            title: "x".to_string(),
            subtitle: "y".to_string(),
            is_active: true,
        };
        assert!(repo
            .update_info_card(Uuid::new_v4(), &missing)
            .expect("query")
            .is_none());
    }
}
