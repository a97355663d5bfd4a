//! Posting, editing and deleting comments.

use hyper::StatusCode;
use kiosk::news::form::{BAD_WORDS, WARNING};
use kiosk::news::model;
use kiosk::news::views::comments_url;

use super::at_hour;
use crate::common::{App, assert_redirects, login_redirect, news_url, today};

const COMMENT_TEXT: &str = "Текст комментария";
const NEW_COMMENT_TEXT: &str = "Обновлённый комментарий";

#[tokio::test]
async fn anonymous_user_cant_create_comment() {
    let app = App::new().await;
    let news = app.news("Заголовок", today()).await;
    let url = news_url(news.id);

    let response = app.anonymous().post(&url, &[("text", COMMENT_TEXT)]).await;
    assert_redirects(&response, &login_redirect(&url));
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn user_can_create_comment() {
    let app = App::new().await;
    let author = app.user("Мимо Крокодил").await;
    let news = app.news("Заголовок", today()).await;

    let response = app
        .logged_in(&author)
        .post(&news_url(news.id), &[("text", COMMENT_TEXT)])
        .await;
    assert_redirects(&response, &comments_url(news.id));
    assert_eq!(comments_url(news.id), format!("/news/{}/#comments", news.id));

    let comments = model::comments_for(&app.conn().await, news.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, COMMENT_TEXT);
    assert_eq!(comments[0].news_id, news.id);
    assert_eq!(comments[0].author_id, author.id);
}

#[tokio::test]
async fn comment_on_missing_news_is_not_found() {
    let app = App::new().await;
    let author = app.user("Мимо Крокодил").await;

    let response = app
        .logged_in(&author)
        .post("/news/999/", &[("text", COMMENT_TEXT)])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn user_cant_use_bad_words() {
    let app = App::new().await;
    let author = app.user("Мимо Крокодил").await;
    let news = app.news("Заголовок", today()).await;
    let text = format!("Какой-то текст, {}, еще текст", BAD_WORDS[0]);

    let response = app
        .logged_in(&author)
        .post(&news_url(news.id), &[("text", text.as_str())])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.form_errors("text"), [WARNING]);
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let app = App::new().await;
    let author = app.user("Мимо Крокодил").await;
    let news = app.news("Заголовок", today()).await;

    let response = app
        .logged_in(&author)
        .post(&news_url(news.id), &[("text", "")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.form_errors("text").len(), 1);
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn author_can_edit_comment() {
    let app = App::new().await;
    let author = app.user("Автор комментария").await;
    let news = app.news("Заголовок", today()).await;
    let comment = app.comment(news.id, &author, COMMENT_TEXT, at_hour(0)).await;

    let response = app
        .logged_in(&author)
        .post(
            &format!("/news/{comment}/edit_comment/"),
            &[("text", NEW_COMMENT_TEXT)],
        )
        .await;
    assert_redirects(&response, &comments_url(news.id));

    let updated = model::get_comment(&app.conn().await, comment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.text, NEW_COMMENT_TEXT);
}

#[tokio::test]
async fn edited_comment_is_checked_for_bad_words() {
    let app = App::new().await;
    let author = app.user("Автор комментария").await;
    let news = app.news("Заголовок", today()).await;
    let comment = app.comment(news.id, &author, COMMENT_TEXT, at_hour(0)).await;

    let response = app
        .logged_in(&author)
        .post(
            &format!("/news/{comment}/edit_comment/"),
            &[("text", BAD_WORDS[1])],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.form_errors("text"), [WARNING]);

    let unchanged = model::get_comment(&app.conn().await, comment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.text, COMMENT_TEXT);
}

#[tokio::test]
async fn user_cant_edit_comment_of_another_user() {
    let app = App::new().await;
    let author = app.user("Автор комментария").await;
    let reader = app.user("Читатель простой").await;
    let news = app.news("Заголовок", today()).await;
    let comment = app.comment(news.id, &author, COMMENT_TEXT, at_hour(0)).await;

    let response = app
        .logged_in(&reader)
        .post(
            &format!("/news/{comment}/edit_comment/"),
            &[("text", NEW_COMMENT_TEXT)],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let unchanged = model::get_comment(&app.conn().await, comment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.text, COMMENT_TEXT);
}

#[tokio::test]
async fn author_can_delete_comment() {
    let app = App::new().await;
    let author = app.user("Автор комментария").await;
    let news = app.news("Заголовок", today()).await;
    let comment = app.comment(news.id, &author, COMMENT_TEXT, at_hour(0)).await;

    let response = app
        .logged_in(&author)
        .post(&format!("/news/{comment}/delete_comment/"), &[])
        .await;
    assert_redirects(&response, &comments_url(news.id));
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn user_cant_delete_comment_of_another_user() {
    let app = App::new().await;
    let author = app.user("Автор комментария").await;
    let reader = app.user("Читатель простой").await;
    let news = app.news("Заголовок", today()).await;
    let comment = app.comment(news.id, &author, COMMENT_TEXT, at_hour(0)).await;

    let response = app
        .logged_in(&reader)
        .post(&format!("/news/{comment}/delete_comment/"), &[])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 1);
}
