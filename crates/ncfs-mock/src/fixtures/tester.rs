use crate::fixtures::api_prefix;
use crate::state::ServerState;
use crate::table::{TableError, Transition, TransitionTable};

const REF: &str = r#"{"resource_id":{"storage_id":"storage-id","opaque_id":"opaque-id"},"path":"/some/path"}"#;
const FILE_REF: &str = r#"{"resource_id":{"storage_id":"storage-id","opaque_id":"opaque-id"},"path":"some/file/path.txt"}"#;

const ALL_PERMISSIONS: &str = r#"{"add_grant":true,"create_container":true,"delete":true,"get_path":true,"get_quota":true,"initiate_file_download":true,"initiate_file_upload":true,"list_grants":true,"list_container":true,"list_file_versions":true,"list_recycle":true,"move":true,"remove_grant":true,"purge_recycle":true,"restore_file_version":true,"restore_recycle_item":true,"stat":true,"update_grant":true,"deny_grant":true}"#;

const GRANTEE: &str = r#"{"type":1,"Id":{"UserId":{"idp":"0.0.0.0:19000","opaque_id":"f7fbf8c8-139b-4376-b307-cf0a8c2d0d9c","type":1}}}"#;

const RESOURCE_INFO: &str = r#"{"opaque":{},"type":1,"id":{"opaque_id":"fileid-/some/path"},"checksum":{},"etag":"in-json-etag","mime_type":"in-json-mimetype","mtime":{"seconds":1234567890},"path":"/some/path","permission_set":{},"size":12345,"canonical_metadata":{},"arbitrary_metadata":{"metadata":{"foo":"bar"}}}"#;

const REVISIONS: &str = r#"[{"opaque":{"map":{"some":{"value":"ZGF0YQ=="}}},"key":"version-12","size":12345,"mtime":1234567990,"etag":"deadb00f"},{"opaque":{"map":{"different":{"value":"c3R1ZmY="}}},"key":"asdf","size":1235,"mtime":1234567890,"etag":"deadbeef"}]"#;

const RECYCLE: &str = r#"[{"opaque":{},"key":"some-deleted-version","ref":{"resource_id":{},"path":"/some/file.txt"},"size":12345,"deletion_time":{"seconds":1234567890}}]"#;

const SPACE_FILTERS: &str = r#"[{"type":3,"Term":{"Owner":{"idp":"0.0.0.0:19000","opaque_id":"f7fbf8c8-139b-4376-b307-cf0a8c2d0d9c","type":1}}},{"type":2,"Term":{"Id":{"opaque_id":"opaque-id"}}},{"type":4,"Term":{"SpaceType":"home"}}]"#;

// Leading tab is deliberate: replies may carry surrounding whitespace.
const SPACES: &str = "\t[{\"opaque\":{\"map\":{\"bar\":{\"value\":\"c2FtYQ==\"},\"foo\":{\"value\":\"c2FtYQ==\"}}},\"id\":{\"opaque_id\":\"some-opaque-storage-space-id\"},\"owner\":{\"id\":{\"idp\":\"some-idp\",\"opaque_id\":\"some-opaque-user-id\",\"type\":1}},\"root\":{\"storage_id\":\"some-storage-ud\",\"opaque_id\":\"some-opaque-root-id\"},\"name\":\"My Storage Space\",\"quota\":{\"quota_max_bytes\":456,\"quota_max_files\":123},\"space_type\":\"home\",\"mtime\":{\"seconds\":1234567890}}]";

const NEW_SPACE: &str = r#"{"opaque":{"map":{"bar":{"value":"c2FtYQ=="},"foo":{"value":"c2FtYQ=="}}},"owner":{"id":{"idp":"some-idp","opaque_id":"some-opaque-user-id","type":1}},"type":"home","name":"My Storage Space","quota":{"quota_max_bytes":456,"quota_max_files":123}}"#;

/// One exchange per operation for user `tester`. Every entry is
/// state-independent and returns the simulator to EMPTY, except GetHome,
/// which leaves it in HOME.
pub fn tester_table() -> Result<TransitionTable, TableError> {
    let api = api_prefix("tester");
    let op = |name: &str| format!("{api}{name}");

    let grant = format!(r#"{{"ref":{FILE_REF},"g":{{"grantee":{GRANTEE},"permissions":{ALL_PERMISSIONS}}}}}"#);
    let md_query = format!(r#"{{"ref":{REF},"mdKeys":["val1","val2","val3"]}}"#);
    let granted = format!(
        r#"[{{"grantee":{{"type":1,"Id":{{"UserId":{{"idp":"some-idp","opaque_id":"some-opaque-id","type":1}}}}}},"permissions":{ALL_PERMISSIONS}}}]"#
    );

    let empty = ServerState::Empty;
    TransitionTable::from_transitions([
        Transition::post(op("GetHome"), "")
            .respond(200, "yes we are")
            .then(ServerState::Home),
        Transition::post(op("CreateHome"), "").respond(201, "").then(empty),
        Transition::post(op("CreateDir"), REF).respond(201, "").then(empty),
        Transition::post(op("Delete"), REF).then(empty),
        Transition::post(
            op("Move"),
            r#"{"from":{"resource_id":{"storage_id":"storage-id-1","opaque_id":"opaque-id-1"},"path":"/some/old/path"},"to":{"resource_id":{"storage_id":"storage-id-2","opaque_id":"opaque-id-2"},"path":"/some/new/path"}}"#,
        )
        .then(empty),
        Transition::post(op("GetMD"), &md_query)
            .respond(200, RESOURCE_INFO)
            .then(empty),
        Transition::post(op("ListFolder"), &md_query)
            .respond(200, format!("[{RESOURCE_INFO}]"))
            .then(empty),
        Transition::post(
            op("InitiateUpload"),
            &format!(
                r#"{{"ref":{REF},"uploadLength":12345,"metadata":{{"key1":"val1","key2":"val2","key3":"val3"}}}}"#
            ),
        )
        .respond(200, r#"{ "not":"sure", "what": "should be", "returned": "here" }"#)
        .then(empty),
        Transition::put(op("Upload/some/file/path.txt"), "shiny!").then(empty),
        Transition::get(op("Download/some/file/path.txt"))
            .respond(200, "the contents of the file")
            .then(empty),
        Transition::post(op("ListRevisions"), REF)
            .respond(200, REVISIONS)
            .then(empty),
        Transition::get(op("DownloadRevision/some%2Frevision/some/file/path.txt"))
            .respond(200, "the contents of that revision")
            .then(empty),
        Transition::post(
            op("RestoreRevision"),
            &format!(r#"{{"ref":{FILE_REF},"key":"asdf"}}"#),
        )
        .then(empty),
        Transition::post(op("ListRecycle"), r#"{"key":"asdf","path":"/some/file.txt"}"#)
            .respond(200, RECYCLE)
            .then(empty),
        Transition::post(
            op("RestoreRecycleItem"),
            &format!(
                r#"{{"key":"asdf","path":"original/location/when/deleted.txt","restoreRef":{FILE_REF}}}"#
            ),
        )
        .then(empty),
        Transition::post(
            op("PurgeRecycleItem"),
            r#"{"key":"asdf","path":"original/location/when/deleted.txt"}"#,
        )
        .then(empty),
        Transition::post(op("EmptyRecycle"), "").then(empty),
        Transition::post(
            op("GetPathByID"),
            r#"{"storage_id":"storage-id","opaque_id":"opaque-id"}"#,
        )
        .respond(200, "the/path/for/that/id.txt")
        .then(empty),
        Transition::post(op("AddGrant"), &grant).then(empty),
        Transition::post(
            op("DenyGrant"),
            &format!(r#"{{"ref":{FILE_REF},"g":{GRANTEE}}}"#),
        )
        .then(empty),
        Transition::post(op("RemoveGrant"), &grant).then(empty),
        Transition::post(op("UpdateGrant"), &grant).then(empty),
        Transition::post(op("ListGrants"), FILE_REF)
            .respond(200, granted)
            .then(empty),
        Transition::post(op("GetQuota"), "")
            .respond(200, r#"{"maxBytes":456,"maxFiles":123}"#)
            .then(empty),
        Transition::post(
            op("CreateReference"),
            r#"{"path":"some/file/path.txt","url":"http://bing.com/search?q=dotnet"}"#,
        )
        .then(empty),
        Transition::post(op("Shutdown"), "").then(empty),
        Transition::post(
            op("SetArbitraryMetadata"),
            &format!(r#"{{"ref":{FILE_REF},"md":{{"metadata":{{"arbi":"trary","meta":"data"}}}}}}"#),
        )
        .then(empty),
        Transition::post(
            op("UnsetArbitraryMetadata"),
            &format!(r#"{{"ref":{FILE_REF},"keys":["arbi"]}}"#),
        )
        .then(empty),
        Transition::post(op("ListStorageSpaces"), SPACE_FILTERS)
            .respond(200, SPACES)
            .then(empty),
        Transition::post(op("CreateStorageSpace"), NEW_SPACE)
            .respond(200, NEW_SPACE)
            .then(empty),
    ])
}
