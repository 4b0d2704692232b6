use crate::fixtures::api_prefix;
use crate::state::ServerState::{self, *};
use crate::table::{TableError, Transition, TransitionTable};

const FOUND: &str = r#"{ "size": 1 }"#;

const GRANTEE: &str = r#"{"type":1,"Id":{"UserId":{"idp":"0.0.0.0:19000","opaque_id":"4c510ada-c86b-4815-8820-42cdf82c3d51","type":1}}}"#;

/// Grant bodies for `/subdir` before and after the update.
const VIEWER: &str = r#"{"add_grant":false,"create_container":false,"delete":false,"get_path":false,"get_quota":false,"initiate_file_download":false,"initiate_file_upload":false,"list_grants":false,"list_container":false,"list_file_versions":false,"list_recycle":false,"move":true,"remove_grant":false,"purge_recycle":false,"restore_file_version":false,"restore_recycle_item":false,"stat":true,"update_grant":false,"deny_grant":false}"#;
const EDITOR: &str = r#"{"add_grant":false,"create_container":false,"delete":true,"get_path":false,"get_quota":false,"initiate_file_download":false,"initiate_file_upload":false,"list_grants":false,"list_container":false,"list_file_versions":false,"list_recycle":false,"move":true,"remove_grant":false,"purge_recycle":false,"restore_file_version":false,"restore_recycle_item":false,"stat":true,"update_grant":false,"deny_grant":false}"#;

fn at(path: &str) -> String {
    format!(r#"{{"path":"{path}"}}"#)
}

fn stat(path: &str) -> String {
    format!(r#"{{"ref":{},"mdKeys":[]}}"#, at(path))
}

/// GetMD replies for `path`: 404 in `missing` states, the given body in
/// `present` ones. Neither changes the state.
fn stat_transitions(
    rows: &mut Vec<Transition>,
    get_md: &str,
    path: &str,
    missing: &[ServerState],
    present: &[(ServerState, &str)],
) {
    for &state in missing {
        rows.push(
            Transition::post(get_md, &stat(path))
                .when(state)
                .respond(404, "")
                .then(state),
        );
    }
    for &(state, body) in present {
        rows.push(
            Transition::post(get_md, &stat(path))
                .when(state)
                .respond(200, body)
                .then(state),
        );
    }
}

/// The einstein home-directory scenario.
///
/// Replies depend on the simulator state: a directory "exists" only in the
/// states reached by creating it, deleting moves to RECYCLE, restoring to
/// FILE-RESTORED, and so on. Reads keep the current state.
pub fn einstein_table() -> Result<TransitionTable, TableError> {
    let api = api_prefix("einstein");
    let op = |name: &str| format!("{api}{name}");

    let mut rows = vec![
        Transition::post(op("CreateHome"), "").then(Home),
        Transition::post(op("EmptyRecycle"), "").then(Empty),
        Transition::post(op("Delete"), &at("/subdir")).then(Recycle),
        Transition::post(
            op("Move"),
            &format!(r#"{{"from":{},"to":{}}}"#, at("/subdir"), at("/new_subdir")),
        )
        .then(Empty),
        Transition::post(op("GetMD"), &stat("/new_subdir"))
            .respond(200, FOUND)
            .then(Empty),
        Transition::post(
            op("GetPathByID"),
            r#"{"storage_id":"00000000-0000-0000-0000-000000000000","opaque_id":"fileid-%2Fsubdir"}"#,
        )
        .respond(200, "/subdir")
        .then(Empty),
        Transition::post(
            op("InitiateUpload"),
            &format!(r#"{{"ref":{},"uploadLength":0,"metadata":{{}}}}"#, at("/file")),
        )
        .respond(200, r#"{"simple": "yes","tus": "yes"}"#)
        .then(Empty),
        Transition::post(op("ListFolder"), &stat("/"))
            .respond(200, r#"[{"type":2,"path":"/subdir","size":1}]"#)
            .then(Empty),
        Transition::post(
            op("CreateReference"),
            r#"{"path":"/Shares/reference","url":"scheme://target"}"#,
        )
        .then(Reference),
        Transition::post(
            op("SetArbitraryMetadata"),
            &format!(
                r#"{{"ref":{},"md":{{"metadata":{{"foo":"bar"}}}}}}"#,
                at("/subdir")
            ),
        )
        .then(Metadata),
        Transition::post(
            op("UnsetArbitraryMetadata"),
            &format!(r#"{{"ref":{},"keys":["foo"]}}"#, at("/subdir")),
        )
        .then(Subdir),
        Transition::post(
            op("RestoreRevision"),
            &format!(r#"{{"ref":{},"key":"version-1"}}"#, at("/versionedFile")),
        )
        .then(FileRestored),
    ];

    // Directory creation.
    let create_subdir = op("CreateDir");
    for (from, to) in [(Empty, Subdir), (Home, Subdir), (Newdir, SubdirNewdir)] {
        rows.push(
            Transition::post(&create_subdir, &at("/subdir"))
                .when(from)
                .then(to),
        );
    }
    for (from, to) in [(Empty, Newdir), (Home, Newdir), (Subdir, SubdirNewdir)] {
        rows.push(
            Transition::post(&create_subdir, &at("/newdir"))
                .when(from)
                .then(to),
        );
    }

    // Stat, per path and state.
    let get_md = op("GetMD");
    stat_transitions(&mut rows, &get_md, "/", &[Empty], &[(Home, FOUND)]);
    stat_transitions(
        &mut rows,
        &get_md,
        "/newdir",
        &[Empty, Home, Subdir],
        &[(Newdir, FOUND), (SubdirNewdir, FOUND)],
    );
    stat_transitions(
        &mut rows,
        &get_md,
        "/subdir",
        &[Empty, Home, Newdir, Recycle],
        &[
            (Subdir, FOUND),
            (SubdirNewdir, FOUND),
            (
                Metadata,
                r#"{ "size": 1, "arbitrary_metadata": { "metadata": { "foo": "bar" } } }"#,
            ),
        ],
    );
    stat_transitions(
        &mut rows,
        &get_md,
        "/subdirRestored",
        &[Empty, Recycle, Subdir],
        &[(FileRestored, FOUND)],
    );
    stat_transitions(
        &mut rows,
        &get_md,
        "/versionedFile",
        &[],
        &[(Empty, r#"{ "size": 2 }"#), (FileRestored, FOUND)],
    );

    // Shares listing.
    let list_folder = op("ListFolder");
    for state in [Empty, Subdir] {
        rows.push(
            Transition::post(&list_folder, &stat("/Shares"))
                .when(state)
                .respond(404, "")
                .then(state),
        );
    }
    rows.push(
        Transition::post(&list_folder, &stat("/Shares"))
            .when(Reference)
            .respond(
                200,
                r#"[{"type":3,"path":"/Shares/reference","target":"scheme://target"}]"#,
            )
            .then(Reference),
    );

    // Recycle bin.
    let list_recycle = op("ListRecycle");
    rows.push(
        Transition::post(&list_recycle, r#"{"key":"","path":""}"#)
            .when(Empty)
            .respond(200, "[]")
            .then(Empty),
    );
    rows.push(
        Transition::post(&list_recycle, r#"{"key":"","path":""}"#)
            .when(Recycle)
            .respond(
                200,
                r#"[{"type":2,"key":"subdir-key","ref":{"path":"/subdir"},"size":1,"deletion_time":{"seconds":1234567890}}]"#,
            )
            .then(Recycle),
    );
    let restore = op("RestoreRecycleItem");
    rows.push(
        Transition::post(&restore, r#"{"key":"subdir-key","path":""}"#)
            .when(Recycle)
            .then(Subdir),
    );
    rows.push(
        Transition::post(
            &restore,
            &format!(
                r#"{{"key":"subdir-key","path":"","restoreRef":{}}}"#,
                at("/subdirRestored")
            ),
        )
        .when(Recycle)
        .then(FileRestored),
    );

    // Revisions.
    let list_revisions = op("ListRevisions");
    rows.push(
        Transition::post(&list_revisions, &at("/versionedFile"))
            .when(Empty)
            .respond(
                200,
                r#"[{"key":"version-1","size":1,"mtime":1234567890,"etag":"v1"}]"#,
            )
            .then(Empty),
    );
    rows.push(
        Transition::post(&list_revisions, &at("/versionedFile"))
            .when(FileRestored)
            .respond(
                200,
                r#"[{"key":"version-1","size":1,"mtime":1234567890,"etag":"v1"},{"key":"version-2","size":2,"mtime":1234567990,"etag":"v2"}]"#,
            )
            .then(FileRestored),
    );

    // Grants on /subdir.
    let viewer = format!(
        r#"{{"ref":{},"g":{{"grantee":{GRANTEE},"permissions":{VIEWER}}}}}"#,
        at("/subdir")
    );
    let editor = format!(
        r#"{{"ref":{},"g":{{"grantee":{GRANTEE},"permissions":{EDITOR}}}}}"#,
        at("/subdir")
    );
    rows.push(Transition::post(op("AddGrant"), &viewer).then(GrantAdded));
    rows.push(Transition::post(op("UpdateGrant"), &editor).then(GrantUpdated));
    rows.push(
        Transition::post(op("RemoveGrant"), &editor)
            .when(GrantUpdated)
            .then(Subdir),
    );

    let list_grants = op("ListGrants");
    let grants = [
        (Subdir, "[]".to_string()),
        (
            GrantAdded,
            format!(r#"[{{"grantee":{GRANTEE},"permissions":{{"stat":true,"move":true,"delete":false}}}}]"#),
        ),
        (
            GrantUpdated,
            format!(r#"[{{"grantee":{GRANTEE},"permissions":{{"stat":true,"move":true,"delete":true}}}}]"#),
        ),
    ];
    for (state, body) in grants {
        rows.push(
            Transition::post(&list_grants, &at("/subdir"))
                .when(state)
                .respond(200, body)
                .then(state),
        );
    }

    TransitionTable::from_transitions(rows)
}
