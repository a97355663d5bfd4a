//! What the note pages show.

use crate::common::{App, note_url};

#[tokio::test]
async fn note_list_shows_only_own_notes() {
    let app = App::new().await;
    let author = app.user("Лев Толстой").await;
    let reader = app.user("Читатель простой").await;
    let note = app.note("Заголовок", "note-slug", &author).await;

    let response = app.logged_in(&author).get("/notes/").await;
    let object_list = response.context()["object_list"].as_array().unwrap();
    assert_eq!(object_list.len(), 1);
    assert_eq!(object_list[0]["id"], note.id);
    assert_eq!(object_list[0]["slug"], "note-slug");

    let response = app.logged_in(&reader).get("/notes/").await;
    assert!(response.context()["object_list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn note_list_is_ordered_by_creation() {
    let app = App::new().await;
    let author = app.user("Лев Толстой").await;
    app.note("Первая", "first", &author).await;
    app.note("Вторая", "second", &author).await;

    let response = app.logged_in(&author).get("/notes/").await;
    let slugs: Vec<_> = response.context()["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|note| note["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, ["first", "second"]);
}

#[tokio::test]
async fn add_and_edit_pages_contain_a_note_form() {
    let app = App::new().await;
    let author = app.user("Лев Толстой").await;
    app.note("Заголовок", "note-slug", &author).await;
    let client = app.logged_in(&author);

    let response = client.get("/notes/add/").await;
    let form = &response.context()["form"];
    assert_eq!(form["name"], "NoteForm");
    assert_eq!(form["data"]["title"], "");

    let response = client.get(&note_url("note-slug", "edit")).await;
    let form = &response.context()["form"];
    assert_eq!(form["name"], "NoteForm");
    assert_eq!(form["data"]["title"], "Заголовок");
    assert_eq!(form["data"]["slug"], "note-slug");
}

#[tokio::test]
async fn detail_page_renders_the_note() {
    let app = App::new().await;
    let author = app.user("Лев Толстой").await;
    app.note("Заголовок <i>курсив</i>", "note-slug", &author).await;

    let response = app.logged_in(&author).get("/notes/note-slug/").await;
    assert_eq!(response.context()["note"]["slug"], "note-slug");
    assert_eq!(response.context()["user"]["username"], "Лев Толстой");
    assert!(response.body.contains("&lt;i&gt;курсив&lt;&#x2F;i&gt;"));
}
