use super::Result;
use crate::database::error::MemberError;
use crate::database::model::member::StoredMember;
use diesel::prelude::*;
use diesel::{QueryDsl, RunQueryDsl, SelectableHelper};
use dto::member::Member;

/// Load every member record.
/// A record that can't be converted doesn't prevent the others from being returned.
pub fn retrieve_members(
    connection: &mut SqliteConnection,
) -> Result<Vec<std::result::Result<Member, MemberError>>> {
    use crate::database::schema::member::dsl::{id, member};

    let results = member
        .select(StoredMember::as_select())
        .order(id.asc())
        .load(connection)?;

    Ok(results.into_iter().map(Member::try_from).collect())
}

#[cfg(any(test, feature = "demo"))]
pub fn insert_members(
    connection: &mut SqliteConnection,
    members: &[crate::database::model::member::NewMember],
) -> Result<usize> {
    let count = diesel::insert_into(crate::database::schema::member::table)
        .values(members)
        .execute(connection)?;

    Ok(count)
}
