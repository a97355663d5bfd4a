//! What the news pages show.

use super::{at_hour, days_before};
use crate::common::{App, news_url, today};

#[tokio::test]
async fn home_page_is_limited_to_configured_count() {
    let app = App::new().await;
    let limit = app.state.config.site.news_count_on_home_page as usize;
    for index in 0..=limit {
        app.news(&format!("Новость {index}"), days_before(today(), index as i64))
            .await;
    }

    let response = app.anonymous().get("/").await;
    let object_list = response.context()["object_list"].as_array().unwrap();
    assert_eq!(object_list.len(), limit);
}

#[tokio::test]
async fn home_page_shows_newest_first() {
    let app = App::new().await;
    for index in 0..5 {
        app.news(&format!("Новость {index}"), days_before(today(), index))
            .await;
    }

    let response = app.anonymous().get("/").await;
    let dates: Vec<String> = response.context()["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|news| news["date"].as_str().unwrap().to_string())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
    assert_eq!(dates[0], today().to_string());
}

#[tokio::test]
async fn comments_are_shown_oldest_first() {
    let app = App::new().await;
    let author = app.user("Комментатор").await;
    let news = app.news("Заголовок", today()).await;
    // Inserted out of order on purpose
    for hours in [3, 1, 2, 0] {
        app.comment(news.id, &author, &format!("Текст {hours}"), at_hour(hours))
            .await;
    }

    let response = app.anonymous().get(&news_url(news.id)).await;
    let texts: Vec<&str> = response.context()["news"]["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|comment| comment["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, ["Текст 0", "Текст 1", "Текст 2", "Текст 3"]);
    assert_eq!(
        response.context()["news"]["comments"][0]["author"],
        "Комментатор"
    );
}

#[tokio::test]
async fn anonymous_client_has_no_comment_form() {
    let app = App::new().await;
    let news = app.news("Заголовок", today()).await;

    let response = app.anonymous().get(&news_url(news.id)).await;
    assert!(response.context().get("form").is_none());
    assert_eq!(response.context()["news"]["id"], news.id);
}

#[tokio::test]
async fn authorized_client_has_comment_form() {
    let app = App::new().await;
    let reader = app.user("Читатель простой").await;
    let news = app.news("Заголовок", today()).await;

    let response = app.logged_in(&reader).get(&news_url(news.id)).await;
    assert_eq!(response.context()["form"]["name"], "CommentForm");
}
