//! Group definition editing.

use tracing::info;

use super::decode;
use super::error::{CatalogError, CatalogResult};
use super::service::CatalogService;
use crate::catalog::domain::{
    DefinitionKey, GroupDefinition, RelationKind, SchemaEntry, TableSequenceEntry,
};
use crate::database::ports::QueryExecutor;
use crate::dialect::{DefinitionOperation, Dialect};

impl<E: QueryExecutor> CatalogService<E> {
    /// Lists application schemas, followed by schemas only referenced by the
    /// group definition.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when access is denied or the query fails.
    pub async fn list_schemas(&self) -> CatalogResult<Vec<SchemaEntry>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, DefinitionOperation::ListSchemas).await?;
        Ok(decode::all(&rows, decode::schema_entry)?)
    }

    /// Lists the tables and sequences of a schema with their current
    /// assignment, followed by definition rows naming missing relations.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_schemas`].
    pub async fn list_tables_sequences(&self, schema: &str) -> CatalogResult<Vec<TableSequenceEntry>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(
                dialect,
                DefinitionOperation::ListTablesSequences {
                    schema: schema.to_owned(),
                },
            )
            .await?;
        Ok(decode::all(&rows, decode::table_sequence_entry)?)
    }

    async fn single_text_column(
        &self,
        operation: DefinitionOperation,
        column: &str,
    ) -> CatalogResult<Vec<String>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, operation).await?;
        Ok(rows
            .iter()
            .map(|row| row.text(column))
            .collect::<Result<_, _>>()?)
    }

    /// Lists group names used by the group definition.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_schemas`].
    pub async fn known_groups(&self) -> CatalogResult<Vec<String>> {
        self.single_text_column(DefinitionOperation::KnownGroups, "group_name")
            .await
    }

    /// Lists log schema suffixes used by the group definition; empty for
    /// versions without dedicated log schemas.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_schemas`].
    pub async fn known_log_schema_suffixes(&self) -> CatalogResult<Vec<String>> {
        self.single_text_column(DefinitionOperation::KnownSuffixes, "known_suffix")
            .await
    }

    /// Lists user tablespaces.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_schemas`].
    pub async fn known_tablespaces(&self) -> CatalogResult<Vec<String>> {
        self.single_text_column(DefinitionOperation::KnownTablespaces, "spcname")
            .await
    }

    /// Returns the kind of an application relation.
    ///
    /// Only a single sequence row yields [`RelationKind::Sequence`]; anything
    /// else, including a missing relation, is treated as a table.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_schemas`].
    pub async fn relation_kind(&self, schema: &str, tblseq: &str) -> CatalogResult<RelationKind> {
        let dialect = self.reader().await?;
        self.kind_of(dialect, schema, tblseq).await
    }

    async fn kind_of(
        &self,
        dialect: &Dialect,
        schema: &str,
        tblseq: &str,
    ) -> CatalogResult<RelationKind> {
        let rows = self
            .select(
                dialect,
                DefinitionOperation::RelationKind {
                    schema: schema.to_owned(),
                    tblseq: tblseq.to_owned(),
                },
            )
            .await?;
        match rows.as_slice() {
            [row] if row.text("relkind")? == RelationKind::Sequence.as_code() => {
                Ok(RelationKind::Sequence)
            }
            _ => Ok(RelationKind::Table),
        }
    }

    /// Adds a table or sequence to the group definition.
    ///
    /// Columns the installed version lacks are not written, and log
    /// attributes are stored as NULL for sequences.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Access`] for non-administrators and
    /// [`CatalogError::Executor`] when the insert fails.
    pub async fn assign_tblseq(&self, definition: &GroupDefinition) -> CatalogResult<u64> {
        let dialect = self.writer().await?;
        let kind = self
            .kind_of(dialect, &definition.key.schema, &definition.key.tblseq)
            .await?;
        let inserted = self
            .execute(
                dialect,
                DefinitionOperation::Assign {
                    definition: definition.clone(),
                    kind,
                },
            )
            .await?;
        info!(entry = %definition.key, %kind, "relation assigned to group definition");
        Ok(inserted)
    }

    /// Rewrites the group definition row of a table or sequence inside a
    /// transaction, committing only when exactly one row changed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoMatch`] when no row matched,
    /// [`CatalogError::AmbiguousMatch`] when several did, and otherwise the
    /// errors of [`CatalogService::assign_tblseq`].
    pub async fn update_tblseq(&self, definition: &GroupDefinition) -> CatalogResult<()> {
        let dialect = self.writer().await?;
        let kind = self
            .kind_of(dialect, &definition.key.schema, &definition.key.tblseq)
            .await?;
        self.single_row(
            dialect,
            &definition.key,
            DefinitionOperation::Update {
                definition: definition.clone(),
                kind,
            },
        )
        .await?;
        info!(entry = %definition.key, %kind, "group definition updated");
        Ok(())
    }

    /// Removes exactly one group definition row inside a transaction.
    ///
    /// The delete is committed only when it affected one row; otherwise it
    /// is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoMatch`] when no row matched,
    /// [`CatalogError::AmbiguousMatch`] when several did, and
    /// [`CatalogError::Executor`] when a statement failed.
    pub async fn remove_tblseq(&self, key: &DefinitionKey) -> CatalogResult<()> {
        let dialect = self.writer().await?;
        self.single_row(dialect, key, DefinitionOperation::Remove { key: key.clone() })
            .await?;
        info!(entry = %key, "relation removed from group definition");
        Ok(())
    }

    async fn single_row(
        &self,
        dialect: &Dialect,
        key: &DefinitionKey,
        operation: DefinitionOperation,
    ) -> CatalogResult<()> {
        let executor = self.session().executor();
        executor.begin_transaction().await?;
        let affected = match self.execute(dialect, operation).await {
            Ok(count) => count,
            Err(err) => {
                self.abort_transaction().await;
                return Err(err);
            }
        };
        match affected {
            1 => {
                executor.end_transaction().await?;
                Ok(())
            }
            0 => {
                self.abort_transaction().await;
                Err(CatalogError::NoMatch(key.clone()))
            }
            count => {
                self.abort_transaction().await;
                Err(CatalogError::AmbiguousMatch {
                    key: key.clone(),
                    count,
                })
            }
        }
    }
}
